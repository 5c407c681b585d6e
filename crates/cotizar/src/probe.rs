//! Field-level validation detection.
//!
//! Error presentation is not consistent across the fields under test: some
//! render a dedicated `{id}-error` element, some attach an
//! error/invalid-feedback sibling, and format-constrained fields may rely
//! on native constraint validation with no custom element at all. The
//! probe evaluates all three signals as a disjunction inside a polling
//! wait; any one observed signal marks the field invalid.
//!
//! Absence of every signal is best-effort evidence of validity, not proof:
//! it only means no detector fired within the window.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{Driver, ElementHandle};
use crate::field::FieldDescriptor;
use crate::wait::{WaitOptions, Waiter};

/// Default timeout for a validation probe (3 seconds)
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3_000;

/// Evidence that a field is in an invalid state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationSignal {
    /// A dedicated error element for the field is displayed and non-empty
    DedicatedError(String),
    /// A following sibling carrying an error/invalid-feedback marker is
    /// displayed and non-empty
    SiblingError(String),
    /// The field's native constraint validation reports invalid
    NativeInvalid,
}

impl ValidationSignal {
    /// The error message carried by the signal, if any
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::DedicatedError(text) | Self::SiblingError(text) => Some(text),
            Self::NativeInvalid => None,
        }
    }
}

/// Detects whether a field is currently in an invalid/error state
#[derive(Debug, Clone)]
pub struct ValidationProbe {
    waiter: Waiter,
}

impl Default for ValidationProbe {
    fn default() -> Self {
        Self::with_options(WaitOptions::new().with_timeout(DEFAULT_PROBE_TIMEOUT_MS))
    }
}

impl ValidationProbe {
    /// Create a probe with the default 3s window
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a probe with custom wait options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self {
            waiter: Waiter::with_options(options),
        }
    }

    /// Single-shot signal scan, no waiting.
    ///
    /// Walks the field's error chain in declared order (dedicated element
    /// first, then the sibling marker), then falls through to the native
    /// validity state. A failing detector is an absent signal, never an
    /// aborted scan.
    pub fn detect(
        &self,
        driver: &mut dyn Driver,
        field: &FieldDescriptor,
    ) -> Option<ValidationSignal> {
        let mut origin: Option<ElementHandle> = None;
        for strategy in field.error_chain().strategies() {
            let found = if strategy.is_relative() {
                if origin.is_none() {
                    origin = field.resolve(driver).ok();
                }
                let Some(origin) = origin.as_ref() else {
                    continue;
                };
                driver.find_from(origin, strategy).unwrap_or(None)
            } else {
                driver.find(strategy).unwrap_or(None)
            };
            let Some(el) = found else { continue };
            if let Some(message) = displayed_message(driver, &el) {
                debug!(field = %field.id(), %message, "validation signal observed");
                return Some(if strategy.is_relative() {
                    ValidationSignal::SiblingError(message)
                } else {
                    ValidationSignal::DedicatedError(message)
                });
            }
        }

        let natively_invalid = field
            .resolve(driver)
            .and_then(|el| driver.native_invalid(&el))
            .unwrap_or(false);
        if natively_invalid {
            debug!(field = %field.id(), "native validity state reports invalid");
            return Some(ValidationSignal::NativeInvalid);
        }
        None
    }

    /// Whether the field shows any invalid signal within the probe window.
    ///
    /// Returns `true` as soon as a signal is observed; `false` only after
    /// the full window elapses with no signal.
    pub fn is_invalid(&self, driver: &mut dyn Driver, field: &FieldDescriptor) -> bool {
        self.waiter
            .wait_until(|| Ok(self.detect(driver, field).is_some()))
    }

    /// Wait for any of the given fields to turn invalid; returns the
    /// logical id of the first field observed flagged.
    pub fn first_invalid(
        &self,
        driver: &mut dyn Driver,
        fields: &[FieldDescriptor],
    ) -> Option<String> {
        let mut flagged = None;
        let observed = self.waiter.wait_until(|| {
            for field in fields {
                if self.detect(driver, field).is_some() {
                    flagged = Some(field.id().to_string());
                    return Ok(true);
                }
            }
            Ok(false)
        });
        if observed {
            flagged
        } else {
            None
        }
    }
}

fn displayed_message(driver: &mut dyn Driver, el: &ElementHandle) -> Option<String> {
    let displayed = driver.is_displayed(el).unwrap_or(false);
    if !displayed {
        return None;
    }
    let text = driver.text(el).map(|t| t.trim().to_string()).ok()?;
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, MockElement};
    use std::time::Duration;

    fn quick_probe() -> ValidationProbe {
        ValidationProbe::with_options(WaitOptions::new().with_timeout(300).with_poll_interval(20))
    }

    mod signal_tests {
        use super::*;

        #[test]
        fn test_dedicated_error_signal() {
            let mut driver = MockDriver::new();
            driver.page_mut().add(MockElement::input("phone"));
            driver.page_mut().add(
                MockElement::feedback("phone-error", "Phone must be 123-456-7890 format")
                    .displayed(true),
            );

            let field = FieldDescriptor::text("phone");
            let signal = quick_probe().detect(&mut driver, &field).unwrap();
            assert!(matches!(signal, ValidationSignal::DedicatedError(ref m)
                if m.contains("123-456-7890")));
            assert!(quick_probe().is_invalid(&mut driver, &field));
        }

        #[test]
        fn test_sibling_error_signal() {
            let mut driver = MockDriver::new();
            driver.page_mut().add(MockElement::input("postalCode"));
            driver.page_mut().add(
                MockElement::feedback("pc-hint", "Postal code needs a space")
                    .class("invalid-feedback")
                    .displayed(true),
            );

            let field = FieldDescriptor::text("postalCode");
            let signal = quick_probe().detect(&mut driver, &field).unwrap();
            assert!(matches!(signal, ValidationSignal::SiblingError(_)));
        }

        #[test]
        fn test_native_invalid_signal() {
            let mut driver = MockDriver::new();
            driver
                .page_mut()
                .add(MockElement::input("email").native_invalid(true));

            let field = FieldDescriptor::text("email");
            let signal = quick_probe().detect(&mut driver, &field).unwrap();
            assert_eq!(signal, ValidationSignal::NativeInvalid);
            assert!(signal.message().is_none());
        }

        #[test]
        fn test_hidden_or_empty_indicators_do_not_fire() {
            let mut driver = MockDriver::new();
            driver.page_mut().add(MockElement::input("age"));
            // present but hidden
            driver
                .page_mut()
                .add(MockElement::feedback("age-error", "Required"));
            // displayed but blank
            driver.page_mut().add(
                MockElement::feedback("blank", "   ")
                    .class("error")
                    .displayed(true),
            );

            let field = FieldDescriptor::text("age");
            assert!(quick_probe().detect(&mut driver, &field).is_none());
        }

        #[test]
        fn test_no_signal_returns_false_after_full_window() {
            let mut driver = MockDriver::new();
            driver.page_mut().add(MockElement::input("city"));

            let field = FieldDescriptor::text("city");
            let start = std::time::Instant::now();
            assert!(!quick_probe().is_invalid(&mut driver, &field));
            assert!(start.elapsed() >= Duration::from_millis(300));
        }
    }

    mod resilience_tests {
        use super::*;

        #[test]
        fn test_signal_appearing_late_is_caught() {
            let mut driver = MockDriver::new();
            driver.page_mut().add(MockElement::input("phone"));
            driver
                .page_mut()
                .add(MockElement::feedback("phone-error", "bad format"));
            driver.schedule_in(Duration::from_millis(80), |page| page.show("phone-error"));

            let probe = ValidationProbe::with_options(
                WaitOptions::new().with_timeout(2000).with_poll_interval(20),
            );
            assert!(probe.is_invalid(&mut driver, &FieldDescriptor::text("phone")));
        }

        #[test]
        fn test_one_live_signal_wins_even_when_others_error() {
            let mut driver = MockDriver::new();
            // no field element at all: sibling lookup and the native check
            // both fail, but the dedicated element still fires
            driver.page_mut().add(
                MockElement::feedback("accidents-error", "Accidents is required")
                    .displayed(true),
            );

            let field = FieldDescriptor::text("accidents");
            let signal = quick_probe().detect(&mut driver, &field).unwrap();
            assert!(matches!(signal, ValidationSignal::DedicatedError(_)));
        }
    }

    mod first_invalid_tests {
        use super::*;

        #[test]
        fn test_reports_the_flagged_field() {
            let mut driver = MockDriver::new();
            driver.page_mut().add(MockElement::input("age"));
            driver.page_mut().add(MockElement::input("experience"));
            driver
                .page_mut()
                .add(MockElement::feedback("experience-error", "Required").displayed(true));

            let fields = vec![
                FieldDescriptor::text("age"),
                FieldDescriptor::text("experience"),
            ];
            let flagged = quick_probe().first_invalid(&mut driver, &fields);
            assert_eq!(flagged.as_deref(), Some("experience"));
        }

        #[test]
        fn test_none_when_nothing_flags() {
            let mut driver = MockDriver::new();
            driver.page_mut().add(MockElement::input("age"));
            let fields = vec![FieldDescriptor::text("age")];
            assert!(quick_probe().first_invalid(&mut driver, &fields).is_none());
        }
    }
}
