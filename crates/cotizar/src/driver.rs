//! Abstract browser automation trait.
//!
//! The automation engine (element lookup, event dispatch, JavaScript
//! execution) is an external collaborator; everything the harness needs
//! from it is expressed through the [`Driver`] trait so that engines can
//! be swapped without touching the interaction layer. [`crate::mock`]
//! provides the in-memory implementation the test suite runs against.
//!
//! The trait is synchronous: the harness issues one automation command at
//! a time and blocks inside polling waits, so an async channel would buy
//! nothing here.

use serde::{Deserialize, Serialize};

use crate::locator::Strategy;
use crate::result::{CotizarError, CotizarResult};

/// Script that synthesizes a focus-loss event on `arguments[0]`.
pub const BLUR_SCRIPT: &str =
    "arguments[0].dispatchEvent(new Event('blur', {bubbles:true}));";

/// Script that reports the native constraint-validation state of `arguments[0]`.
pub const NATIVE_INVALID_SCRIPT: &str = "return arguments[0].matches(':invalid')";

/// Opaque handle to a DOM element resolved by a [`Driver`].
///
/// Handles are only valid against the driver that produced them and may go
/// stale if the page mutates; stale-handle operations surface as
/// [`CotizarError::ElementNotFound`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-scoped identifier for the element
    pub id: String,
    /// Element tag name
    pub tag_name: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
        }
    }
}

/// Capability interface over the browser automation engine.
///
/// A single strategy miss is reported as `Ok(None)` from [`Driver::find`],
/// not as an error: "element absent" is an expected condition that locator
/// chains and validation probes branch on.
pub trait Driver {
    /// Navigate to a URL
    fn goto(&mut self, url: &str) -> CotizarResult<()>;

    /// Find the first element matching a single strategy
    fn find(&mut self, strategy: &Strategy) -> CotizarResult<Option<ElementHandle>>;

    /// Find the first element matching a strategy relative to `origin`
    fn find_from(
        &mut self,
        origin: &ElementHandle,
        strategy: &Strategy,
    ) -> CotizarResult<Option<ElementHandle>>;

    /// Whether the element is currently rendered visible
    fn is_displayed(&mut self, el: &ElementHandle) -> CotizarResult<bool>;

    /// Visible text content of the element
    fn text(&mut self, el: &ElementHandle) -> CotizarResult<String>;

    /// Read an attribute; `None` when the attribute is absent
    fn attribute(&mut self, el: &ElementHandle, name: &str) -> CotizarResult<Option<String>>;

    /// Clear any existing content of an input element
    fn clear(&mut self, el: &ElementHandle) -> CotizarResult<()>;

    /// Type text into an input element
    fn type_text(&mut self, el: &ElementHandle, text: &str) -> CotizarResult<()>;

    /// Click the element
    fn click(&mut self, el: &ElementHandle) -> CotizarResult<()>;

    /// Select an option by its visible text.
    ///
    /// Fails when the element has no selection semantics (e.g. it is a
    /// plain text input); callers fall back to typed text in that case.
    fn select_by_visible_text(&mut self, el: &ElementHandle, text: &str) -> CotizarResult<()>;

    /// Execute JavaScript in page context, optionally binding `arguments[0]`
    fn execute_js(
        &mut self,
        script: &str,
        target: Option<&ElementHandle>,
    ) -> CotizarResult<serde_json::Value>;

    /// Full visible text of the current page
    fn page_text(&mut self) -> CotizarResult<String>;

    /// Delete all cookies for the current site
    fn delete_all_cookies(&mut self) -> CotizarResult<()>;

    /// Release the underlying browser handle
    fn quit(&mut self) -> CotizarResult<()>;

    /// Synthesize a focus-loss event on the element without any other
    /// interaction. Drives client-side validation that only fires on blur.
    fn dispatch_blur(&mut self, el: &ElementHandle) -> CotizarResult<()> {
        self.execute_js(BLUR_SCRIPT, Some(el))?;
        Ok(())
    }

    /// Whether the element's native constraint validation reports invalid
    fn native_invalid(&mut self, el: &ElementHandle) -> CotizarResult<bool> {
        let value = self.execute_js(NATIVE_INVALID_SCRIPT, Some(el))?;
        value.as_bool().ok_or_else(|| CotizarError::DriverError {
            message: format!("validity probe returned non-boolean: {value}"),
        })
    }
}
