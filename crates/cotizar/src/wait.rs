//! Polling wait primitive.
//!
//! Every time-based coordination in the harness goes through [`Waiter`]:
//! elements appearing after navigation, validation labels rendered on blur,
//! the quote field filling in after submission. No other component sleeps.
//!
//! A predicate error that stems from a transiently missing element is
//! treated as "currently false", not as wait failure, so that elements
//! appearing asynchronously do not abort the wait early.

use std::time::{Duration, Instant};

use crate::result::{CotizarError, CotizarResult};

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Condition-polling engine.
///
/// Repeatedly evaluates a predicate against the live page until it holds
/// or the timeout budget is spent.
#[derive(Debug, Clone, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a waiter with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// The options this waiter polls with
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `predicate` until it returns `Ok(true)` or the timeout elapses.
    ///
    /// Returns the final observation: `true` only if the predicate was seen
    /// true before expiry. `Err` from the predicate reads as false: a
    /// probe against an element that has not appeared yet is an ordinary
    /// negative observation.
    pub fn wait_until<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut() -> CotizarResult<bool>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let poll_interval = self.options.poll_interval();

        while start.elapsed() < timeout {
            if predicate().unwrap_or(false) {
                return true;
            }
            std::thread::sleep(poll_interval);
        }

        // one last look after the budget is spent, as the page may have
        // settled during the final sleep
        predicate().unwrap_or(false)
    }

    /// Like [`Waiter::wait_until`] but an expired wait is an error.
    ///
    /// For waits that guard a hard dependency, where "still absent" means
    /// the scenario cannot proceed.
    pub fn require<F>(&self, mut predicate: F) -> CotizarResult<()>
    where
        F: FnMut() -> CotizarResult<bool>,
    {
        if self.wait_until(&mut predicate) {
            Ok(())
        } else {
            Err(CotizarError::Timeout {
                ms: self.options.timeout_ms,
            })
        }
    }
}
