//! Quote form page object.
//!
//! The externally-defined surface of the form under test: its eleven
//! logical fields, the submission control and the result field, each
//! behind a locator chain so markup drift stays absorbed here.

use tracing::debug;

use crate::driver::Driver;
use crate::field::{FieldDescriptor, FormState};
use crate::locator::{LocatorChain, Strategy};
use crate::result::{CotizarError, CotizarResult};

/// id of the submission control
pub const SUBMIT_ID: &str = "btnSubmit";

/// id of the field exposing the computed quote as its value attribute
pub const QUOTE_FIELD_ID: &str = "finalQuote";

/// Registry of the quote form's fields and controls
#[derive(Debug, Clone)]
pub struct QuoteForm {
    fields: Vec<FieldDescriptor>,
    submit_chain: LocatorChain,
    quote_chain: LocatorChain,
}

impl Default for QuoteForm {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteForm {
    /// The form as the application under test exposes it
    #[must_use]
    pub fn new() -> Self {
        let fields = vec![
            FieldDescriptor::text("firstName"),
            FieldDescriptor::text("lastName"),
            FieldDescriptor::text("address"),
            FieldDescriptor::text("city"),
            // choice or free-text depending on the build
            FieldDescriptor::choice("province"),
            FieldDescriptor::text("postalCode"),
            FieldDescriptor::text("phone"),
            FieldDescriptor::text("email"),
            FieldDescriptor::text("age"),
            FieldDescriptor::text("experience"),
            FieldDescriptor::text("accidents"),
        ];
        Self {
            fields,
            submit_chain: LocatorChain::first(SUBMIT_ID, Strategy::id(SUBMIT_ID)),
            quote_chain: LocatorChain::first(QUOTE_FIELD_ID, Strategy::id(QUOTE_FIELD_ID)),
        }
    }

    /// All field descriptors in form order
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by logical id
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id() == id)
    }

    /// The field whose presence marks the form as rendered
    #[must_use]
    pub fn first_field(&self) -> &FieldDescriptor {
        &self.fields[0]
    }

    /// Locator chain for the result field
    #[must_use]
    pub const fn quote_chain(&self) -> &LocatorChain {
        &self.quote_chain
    }

    /// Enter every value of `state` into its field.
    ///
    /// # Errors
    ///
    /// Returns [`CotizarError::ElementNotFound`] for an entry naming a
    /// field the form does not have, or when a field fails to resolve.
    pub fn fill(&self, driver: &mut dyn Driver, state: &FormState) -> CotizarResult<()> {
        for (id, value) in state.iter() {
            let field = self
                .field(id)
                .ok_or_else(|| CotizarError::ElementNotFound {
                    target: id.to_string(),
                })?;
            field.set(driver, value)?;
        }
        debug!(entries = state.len(), "form filled");
        Ok(())
    }

    /// Activate the submission control
    pub fn submit(&self, driver: &mut dyn Driver) -> CotizarResult<()> {
        let el = self.submit_chain.resolve(driver)?;
        driver.click(&el)
    }

    /// Read the quote field's current value, trimmed; a missing quote
    /// field reads as empty
    pub fn quote_value(&self, driver: &mut dyn Driver) -> String {
        let Ok(el) = self.quote_chain.resolve(driver) else {
            return String::new();
        };
        driver
            .attribute(&el, "value")
            .ok()
            .flatten()
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }
}
