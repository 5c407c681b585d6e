//! Fallback element location.
//!
//! The markup under test is not owned by this harness and drifts between
//! builds. A [`LocatorChain`] absorbs that drift: an ordered list of
//! [`Strategy`] values for one logical target, tried strictly in declared
//! order, stopping at the first hit. A strategy miss is data
//! (`Ok(None)` from the driver), never exception-driven control flow;
//! only an exhausted chain is an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{Driver, ElementHandle};
use crate::result::{CotizarError, CotizarResult};

/// A rule for finding one UI element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// By element id attribute
    Id(String),
    /// By CSS selector
    Css(String),
    /// By exact anchor text
    LinkText(String),
    /// By XPath expression; paths starting with `./` resolve relative to
    /// an origin element
    XPath(String),
}

impl Strategy {
    /// Create an id strategy
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a CSS selector strategy
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a link-text strategy
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Create an XPath strategy
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Whether this strategy only resolves relative to an origin element
    #[must_use]
    pub fn is_relative(&self) -> bool {
        matches!(self, Self::XPath(expr) if expr.starts_with("./"))
    }

    /// Short description for logs and error messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Id(id) => format!("id={id}"),
            Self::Css(sel) => format!("css={sel}"),
            Self::LinkText(text) => format!("link-text={text}"),
            Self::XPath(expr) => format!("xpath={expr}"),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Ordered fallback strategies for one logical target.
///
/// Non-empty by construction: build with [`LocatorChain::first`] and chain
/// alternatives with [`LocatorChain::or`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorChain {
    target: String,
    strategies: Vec<Strategy>,
}

impl LocatorChain {
    /// Start a chain with its primary strategy
    #[must_use]
    pub fn first(target: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            target: target.into(),
            strategies: vec![strategy],
        }
    }

    /// Append a fallback strategy
    #[must_use]
    pub fn or(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Build a chain from an existing strategy list.
    ///
    /// # Errors
    ///
    /// Returns [`CotizarError::EmptyChain`] when `strategies` is empty.
    pub fn try_new(
        target: impl Into<String>,
        strategies: Vec<Strategy>,
    ) -> CotizarResult<Self> {
        let target = target.into();
        if strategies.is_empty() {
            return Err(CotizarError::EmptyChain { target });
        }
        Ok(Self { target, strategies })
    }

    /// The logical target this chain resolves
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The strategies in declared order
    #[must_use]
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Try each strategy in declared order; the first hit short-circuits
    /// the rest.
    ///
    /// # Errors
    ///
    /// Returns [`CotizarError::ElementNotFound`] only after every strategy
    /// has failed.
    pub fn resolve(&self, driver: &mut dyn Driver) -> CotizarResult<ElementHandle> {
        self.resolve_with_origin(driver, None)
    }

    /// Resolve with an origin element for relative strategies.
    ///
    /// Relative strategies are skipped when no origin is supplied.
    pub fn resolve_with_origin(
        &self,
        driver: &mut dyn Driver,
        origin: Option<&ElementHandle>,
    ) -> CotizarResult<ElementHandle> {
        for strategy in &self.strategies {
            let found = if strategy.is_relative() {
                match origin {
                    Some(origin) => driver.find_from(origin, strategy),
                    None => continue,
                }
            } else {
                driver.find(strategy)
            };
            match found {
                Ok(Some(el)) => return Ok(el),
                Ok(None) => {
                    debug!(target = %self.target, strategy = %strategy, "strategy missed");
                }
                Err(err) => {
                    debug!(target = %self.target, strategy = %strategy, %err, "strategy errored");
                }
            }
        }
        Err(CotizarError::ElementNotFound {
            target: self.target.clone(),
        })
    }
}
