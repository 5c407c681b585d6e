//! Landing page to quote form.
//!
//! Opening the form is the one hard dependency of every scenario: if no
//! entry-point strategy succeeds, or the form never finishes rendering,
//! there is nothing meaningful left to test and the failure is fatal.

use tracing::debug;

use crate::driver::Driver;
use crate::form::QuoteForm;
use crate::locator::{LocatorChain, Strategy};
use crate::result::{CotizarError, CotizarResult};
use crate::session::Session;

/// Drives the browser from the landing page into the quote form
#[derive(Debug, Clone)]
pub struct NavigationBootstrapper {
    entry_chain: LocatorChain,
}

impl Default for NavigationBootstrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationBootstrapper {
    /// Bootstrapper with the form's known entry points: the quote link by
    /// text, an anchor targeting `getQuote`, or the button/primary-anchor
    /// fallback
    #[must_use]
    pub fn new() -> Self {
        Self {
            entry_chain: LocatorChain::first(
                "quote form entry",
                Strategy::link_text("Get a New Quote!"),
            )
            .or(Strategy::css("a[href*='getQuote']"))
            .or(Strategy::css("button#btnGetQuote, a.btn-primary")),
        }
    }

    /// Replace the entry-point chain
    #[must_use]
    pub fn with_entry_chain(mut self, chain: LocatorChain) -> Self {
        self.entry_chain = chain;
        self
    }

    /// Find and activate the form's entry point, then block until the
    /// form's first-field marker is present and visible.
    ///
    /// # Errors
    ///
    /// Returns [`CotizarError::NavigationFailed`] when every entry
    /// strategy fails or the marker never appears within the session's
    /// wait budget.
    pub fn open_quote_form<D: Driver>(
        &self,
        session: &mut Session<D>,
        form: &QuoteForm,
    ) -> CotizarResult<()> {
        let waiter = session.waiter();
        let driver = session.driver();

        let entry =
            self.entry_chain
                .resolve(driver)
                .map_err(|err| CotizarError::NavigationFailed {
                    message: format!("no entry-point strategy succeeded: {err}"),
                })?;
        driver
            .click(&entry)
            .map_err(|err| CotizarError::NavigationFailed {
                message: format!("entry point did not accept activation: {err}"),
            })?;
        debug!(entry = %entry.id, "quote form entry activated");

        let marker = form.first_field();
        waiter
            .require(|| {
                let el = marker.resolve(driver)?;
                driver.is_displayed(&el)
            })
            .map_err(|_| CotizarError::NavigationFailed {
                message: format!("'{}' marker never became visible", marker.id()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};
    use crate::wait::WaitOptions;
    use std::time::Duration;

    fn quick_session(driver: MockDriver) -> Session<MockDriver> {
        Session::new(driver, "http://localhost/prog8170a04/")
            .with_wait_options(WaitOptions::new().with_timeout(300).with_poll_interval(20))
    }

    fn landing_with_link() -> MockDriver {
        let mut driver = MockDriver::new();
        driver
            .page_mut()
            .add(MockElement::anchor("quoteLink", "Get a New Quote!").href("getQuote.html"));
        driver
            .page_mut()
            .add(MockElement::input("firstName").displayed(false));
        driver.on_click("quoteLink", |page| page.show("firstName"));
        driver
    }

    #[test]
    fn test_opens_via_link_text() {
        let mut session = quick_session(landing_with_link());
        NavigationBootstrapper::new()
            .open_quote_form(&mut session, &QuoteForm::new())
            .unwrap();
        assert!(session.driver_ref().was_called("click:quoteLink"));
    }

    #[test]
    fn test_falls_back_to_href_match() {
        let mut driver = MockDriver::new();
        // link text differs in this build; href still matches
        driver
            .page_mut()
            .add(MockElement::anchor("quoteLink", "New Quote").href("app/getQuote.php"));
        driver.page_mut().add(MockElement::input("firstName"));
        driver.on_click("quoteLink", |_| {});

        let mut session = quick_session(driver);
        NavigationBootstrapper::new()
            .open_quote_form(&mut session, &QuoteForm::new())
            .unwrap();
        assert!(session.driver_ref().was_called("find:css=a[href*='getQuote']"));
    }

    #[test]
    fn test_falls_back_to_primary_button() {
        let mut driver = MockDriver::new();
        driver
            .page_mut()
            .add(MockElement::button("btnGetQuote", "Start"));
        driver.page_mut().add(MockElement::input("firstName"));

        let mut session = quick_session(driver);
        NavigationBootstrapper::new()
            .open_quote_form(&mut session, &QuoteForm::new())
            .unwrap();
        assert!(session.driver_ref().was_called("click:btnGetQuote"));
    }

    #[test]
    fn test_waits_for_slow_form_render() {
        let mut driver = landing_with_link();
        // the click reveals nothing immediately; the form renders late
        driver.on_click("quoteLink", |_| {});
        driver.schedule_in(Duration::from_millis(80), |page| page.show("firstName"));

        let mut session = Session::new(driver, "http://localhost/")
            .with_wait_options(WaitOptions::new().with_timeout(2000).with_poll_interval(20));
        NavigationBootstrapper::new()
            .open_quote_form(&mut session, &QuoteForm::new())
            .unwrap();
    }

    #[test]
    fn test_no_entry_point_is_fatal() {
        let mut session = quick_session(MockDriver::new());
        let err = NavigationBootstrapper::new()
            .open_quote_form(&mut session, &QuoteForm::new())
            .unwrap_err();
        assert!(matches!(err, CotizarError::NavigationFailed { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_marker_is_fatal() {
        let mut driver = landing_with_link();
        driver.on_click("quoteLink", |_| {}); // form never renders

        let mut session = quick_session(driver);
        let err = NavigationBootstrapper::new()
            .open_quote_form(&mut session, &QuoteForm::new())
            .unwrap_err();
        assert!(
            matches!(err, CotizarError::NavigationFailed { ref message }
                if message.contains("firstName"))
        );
    }
}
