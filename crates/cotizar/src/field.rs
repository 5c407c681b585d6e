//! Logical form fields and fill/clear/read operations.
//!
//! A [`FieldDescriptor`] names a logical field (`age`, `postalCode`) and
//! carries two locator chains: one for the control itself and one for its
//! error indicator. Choice controls (the province selector) are filled by
//! visible text first, with a typed-text fallback, so the field may be a
//! native select or a free-text input interchangeably.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{Driver, ElementHandle};
use crate::locator::{LocatorChain, Strategy};
use crate::result::CotizarResult;

/// Relative XPath for the nearest following error/invalid-feedback marker
pub const ERROR_SIBLING_XPATH: &str =
    "./following::*[contains(@class,'error') or contains(@class,'invalid-feedback')][1]";

/// How a field accepts its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Plain text entry
    Text,
    /// Closed choice; selection by visible text with text-entry fallback
    Choice,
}

/// A logical form field with its locator chains
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    id: String,
    kind: FieldKind,
    chain: LocatorChain,
    error_chain: LocatorChain,
}

impl FieldDescriptor {
    /// A plain text field located by its id, with the default error chain
    /// (`{id}-error` element, then the nearest following error sibling)
    #[must_use]
    pub fn text(id: impl Into<String>) -> Self {
        Self::with_kind(id, FieldKind::Text)
    }

    /// A closed-choice field located by its id
    #[must_use]
    pub fn choice(id: impl Into<String>) -> Self {
        Self::with_kind(id, FieldKind::Choice)
    }

    fn with_kind(id: impl Into<String>, kind: FieldKind) -> Self {
        let id = id.into();
        let chain = LocatorChain::first(id.clone(), Strategy::id(id.clone()));
        let error_chain =
            LocatorChain::first(format!("{id} error"), Strategy::id(format!("{id}-error")))
                .or(Strategy::xpath(ERROR_SIBLING_XPATH));
        Self {
            id,
            kind,
            chain,
            error_chain,
        }
    }

    /// Replace the control's locator chain
    #[must_use]
    pub fn with_chain(mut self, chain: LocatorChain) -> Self {
        self.chain = chain;
        self
    }

    /// Logical identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// How the field accepts values
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Locator chain for the control
    #[must_use]
    pub const fn chain(&self) -> &LocatorChain {
        &self.chain
    }

    /// Locator chain for the field's error indicator
    #[must_use]
    pub const fn error_chain(&self) -> &LocatorChain {
        &self.error_chain
    }

    /// Resolve the control element
    pub fn resolve(&self, driver: &mut dyn Driver) -> CotizarResult<ElementHandle> {
        self.chain.resolve(driver)
    }

    /// Clear the field, then enter `value` when present.
    ///
    /// `None` represents an omitted field: only the clear step runs. For
    /// [`FieldKind::Choice`] fields, selection by visible text is tried
    /// first; if the control has no selection semantics the value is typed.
    pub fn set(&self, driver: &mut dyn Driver, value: Option<&str>) -> CotizarResult<()> {
        let el = self.resolve(driver)?;
        driver.clear(&el)?;
        let Some(value) = value else {
            return Ok(());
        };
        if self.kind == FieldKind::Choice {
            match driver.select_by_visible_text(&el, value) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    debug!(field = %self.id, %err, "selection unsupported, typing instead");
                }
            }
        }
        driver.type_text(&el, value)
    }

    /// Synthesize a focus-loss event on the field, with no other interaction
    pub fn blur(&self, driver: &mut dyn Driver) -> CotizarResult<()> {
        let el = self.resolve(driver)?;
        driver.dispatch_blur(&el)
    }

    /// Read the field's current value attribute
    pub fn read(&self, driver: &mut dyn Driver) -> CotizarResult<String> {
        let el = self.resolve(driver)?;
        Ok(driver.attribute(&el, "value")?.unwrap_or_default())
    }
}

/// Values to enter for one fill operation.
///
/// Keys are logical field identifiers, unique per fill; a `None` value
/// records an explicitly omitted field (cleared, left blank). Constructed
/// fresh per scenario and discarded after submission.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    entries: BTreeMap<String, Option<String>>,
}

impl FormState {
    /// Create an empty form state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field's value; replaces any previous entry for the same field
    #[must_use]
    pub fn set(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.entries.insert(id.into(), Some(value.into()));
        self
    }

    /// Record a field as omitted: it will be cleared and left blank
    #[must_use]
    pub fn omit(mut self, id: impl Into<String>) -> Self {
        let _ = self.entries.insert(id.into(), None);
        self
    }

    /// Look up an entry
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Option<&str>> {
        self.entries.get(id).map(|v| v.as_deref())
    }

    /// Iterate entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the state is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
