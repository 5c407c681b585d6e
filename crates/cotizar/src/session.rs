//! Scenario-scoped browser session.
//!
//! One [`Session`] per scenario: it owns the automation handle and the
//! default wait budget, is created at scenario start, and is fully torn
//! down at scenario end regardless of outcome. Teardown failures are
//! logged and discarded; cleanup must never mask or overwrite a test's
//! actual result. Sessions are never shared across scenarios.

use tracing::warn;

use crate::driver::Driver;
use crate::result::{CotizarError, CotizarResult};
use crate::wait::{WaitOptions, Waiter};

/// One browser automation handle plus its default wait budget
pub struct Session<D: Driver> {
    driver: D,
    home_url: String,
    wait: WaitOptions,
    torn_down: bool,
}

impl<D: Driver> std::fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("home_url", &self.home_url)
            .field("wait", &self.wait)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl<D: Driver> Session<D> {
    /// Create a session over an automation handle
    pub fn new(driver: D, home_url: impl Into<String>) -> Self {
        Self {
            driver,
            home_url: home_url.into(),
            wait: WaitOptions::default(),
            torn_down: false,
        }
    }

    /// Override the default wait budget
    #[must_use]
    pub fn with_wait_options(mut self, options: WaitOptions) -> Self {
        self.wait = options;
        self
    }

    /// Navigate to the landing page
    pub fn start(&mut self) -> CotizarResult<()> {
        let url = self.home_url.clone();
        self.driver
            .goto(&url)
            .map_err(|err| CotizarError::SessionError {
                message: format!("could not reach '{url}': {err}"),
            })
    }

    /// The landing page URL
    #[must_use]
    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    /// The session's default wait options
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        self.wait
    }

    /// A waiter polling with the session's default budget
    #[must_use]
    pub fn waiter(&self) -> Waiter {
        Waiter::with_options(self.wait)
    }

    /// Mutable access to the automation handle
    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Read access to the automation handle
    #[must_use]
    pub fn driver_ref(&self) -> &D {
        &self.driver
    }

    /// Purge cookies and release the browser handle.
    ///
    /// Idempotent. Failures are logged and swallowed: by the time teardown
    /// runs the scenario's pass/fail is already decided, and a dying
    /// browser must not rewrite it.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Err(err) = self.driver.delete_all_cookies() {
            warn!(%err, "cookie purge failed during teardown");
        }
        if let Err(err) = self.driver.quit() {
            warn!(%err, "browser quit failed during teardown");
        }
    }
}

impl<D: Driver> Drop for Session<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ElementHandle;
    use crate::locator::Strategy;
    use crate::mock::MockDriver;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_start_navigates_home() {
        let mut session = Session::new(MockDriver::new(), "http://localhost/prog8170a04/");
        session.start().unwrap();
        assert_eq!(session.driver_ref().url(), "http://localhost/prog8170a04/");
    }

    #[test]
    fn test_teardown_purges_cookies_and_quits() {
        let mut session = Session::new(MockDriver::new(), "http://localhost/");
        session.teardown();
        assert!(session.driver_ref().cookies_cleared);
        assert!(session.driver_ref().quit_called);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut session = Session::new(MockDriver::new(), "http://localhost/");
        session.teardown();
        session.teardown();
        let quits = session
            .driver_ref()
            .history()
            .iter()
            .filter(|c| c.as_str() == "quit")
            .count();
        assert_eq!(quits, 1);
    }

    #[test]
    fn test_teardown_swallows_driver_failures() {
        let mut driver = MockDriver::new();
        driver.fail_on_delete_cookies = true;
        driver.fail_on_quit = true;
        let mut session = Session::new(driver, "http://localhost/");
        // must not panic or propagate
        session.teardown();
        assert!(session.driver_ref().was_called("delete_all_cookies"));
        assert!(session.driver_ref().was_called("quit"));
    }

    #[test]
    fn test_cookie_failure_does_not_skip_quit() {
        let mut driver = MockDriver::new();
        driver.fail_on_delete_cookies = true;
        let mut session = Session::new(driver, "http://localhost/");
        session.teardown();
        assert!(session.driver_ref().quit_called);
    }

    /// Driver wrapper that reports quit through a shared flag, so teardown
    /// on drop is observable from outside the session.
    struct QuitProbe {
        inner: MockDriver,
        quit_flag: Arc<AtomicBool>,
    }

    impl Driver for QuitProbe {
        fn goto(&mut self, url: &str) -> crate::CotizarResult<()> {
            self.inner.goto(url)
        }
        fn find(&mut self, s: &Strategy) -> crate::CotizarResult<Option<ElementHandle>> {
            self.inner.find(s)
        }
        fn find_from(
            &mut self,
            o: &ElementHandle,
            s: &Strategy,
        ) -> crate::CotizarResult<Option<ElementHandle>> {
            self.inner.find_from(o, s)
        }
        fn is_displayed(&mut self, el: &ElementHandle) -> crate::CotizarResult<bool> {
            self.inner.is_displayed(el)
        }
        fn text(&mut self, el: &ElementHandle) -> crate::CotizarResult<String> {
            self.inner.text(el)
        }
        fn attribute(
            &mut self,
            el: &ElementHandle,
            name: &str,
        ) -> crate::CotizarResult<Option<String>> {
            self.inner.attribute(el, name)
        }
        fn clear(&mut self, el: &ElementHandle) -> crate::CotizarResult<()> {
            self.inner.clear(el)
        }
        fn type_text(&mut self, el: &ElementHandle, text: &str) -> crate::CotizarResult<()> {
            self.inner.type_text(el, text)
        }
        fn click(&mut self, el: &ElementHandle) -> crate::CotizarResult<()> {
            self.inner.click(el)
        }
        fn select_by_visible_text(
            &mut self,
            el: &ElementHandle,
            text: &str,
        ) -> crate::CotizarResult<()> {
            self.inner.select_by_visible_text(el, text)
        }
        fn execute_js(
            &mut self,
            script: &str,
            target: Option<&ElementHandle>,
        ) -> crate::CotizarResult<serde_json::Value> {
            self.inner.execute_js(script, target)
        }
        fn page_text(&mut self) -> crate::CotizarResult<String> {
            self.inner.page_text()
        }
        fn delete_all_cookies(&mut self) -> crate::CotizarResult<()> {
            self.inner.delete_all_cookies()
        }
        fn quit(&mut self) -> crate::CotizarResult<()> {
            self.quit_flag.store(true, Ordering::SeqCst);
            self.inner.quit()
        }
    }

    #[test]
    fn test_drop_runs_teardown() {
        let quit_flag = Arc::new(AtomicBool::new(false));
        {
            let _session = Session::new(
                QuitProbe {
                    inner: MockDriver::new(),
                    quit_flag: quit_flag.clone(),
                },
                "http://localhost/",
            );
        }
        assert!(quit_flag.load(Ordering::SeqCst));
    }
}
