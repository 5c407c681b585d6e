//! Result and error types for Cotizar.

use thiserror::Error;

/// Result type for Cotizar operations
pub type CotizarResult<T> = Result<T, CotizarError>;

/// Errors that can occur in Cotizar
#[derive(Debug, Error)]
pub enum CotizarError {
    /// Every strategy in a locator chain failed to resolve.
    ///
    /// Non-fatal while a fallback chain is still being walked; fatal only
    /// when the exhausted chain guarded a hard dependency.
    #[error("no locator strategy resolved '{target}'")]
    ElementNotFound {
        /// Logical target the chain was resolving
        target: String,
    },

    /// A locator chain was constructed with no strategies
    #[error("locator chain for '{target}' has no strategies")]
    EmptyChain {
        /// Logical target the chain was meant to resolve
        target: String,
    },

    /// The quote form could not be opened; fatal to the scenario
    #[error("could not open the quote form: {message}")]
    NavigationFailed {
        /// What went wrong
        message: String,
    },

    /// A required wait expired
    #[error("operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// The underlying automation engine reported a failure
    #[error("driver error: {message}")]
    DriverError {
        /// Error message from the engine
        message: String,
    },

    /// Session lifecycle error (start/teardown)
    #[error("session error: {message}")]
    SessionError {
        /// Error message
        message: String,
    },
}

impl CotizarError {
    /// Whether this error is fatal to a scenario.
    ///
    /// `ElementNotFound` is ordinary fallback traffic; navigation and
    /// session failures leave nothing meaningful to test.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NavigationFailed { .. } | Self::SessionError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_display() {
        let err = CotizarError::ElementNotFound {
            target: "finalQuote".to_string(),
        };
        assert_eq!(err.to_string(), "no locator strategy resolved 'finalQuote'");
    }

    #[test]
    fn test_timeout_display() {
        let err = CotizarError::Timeout { ms: 3000 };
        assert_eq!(err.to_string(), "operation timed out after 3000ms");
    }

    #[test]
    fn test_fatality() {
        assert!(CotizarError::NavigationFailed {
            message: "no entry point".to_string()
        }
        .is_fatal());
        assert!(CotizarError::SessionError {
            message: "gone".to_string()
        }
        .is_fatal());
        assert!(!CotizarError::ElementNotFound {
            target: "age-error".to_string()
        }
        .is_fatal());
        assert!(!CotizarError::Timeout { ms: 100 }.is_fatal());
    }
}
