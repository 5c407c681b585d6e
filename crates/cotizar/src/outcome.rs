//! Submission outcome classification.
//!
//! After submission the page settles into one of four states. The
//! classifier waits a bounded window for the quote field, reads its
//! value, and decides:
//!
//! - a priced value with no refusal language is [`Outcome::Accepted`];
//! - refusal vocabulary in the value or the page body is
//!   [`Outcome::Refused`];
//! - an empty or placeholder value with a flagged field is
//!   [`Outcome::Blocked`];
//! - anything else is [`Outcome::Indeterminate`], which is always a
//!   scenario failure.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::Driver;
use crate::form::QuoteForm;
use crate::probe::ValidationProbe;
use crate::wait::{WaitOptions, Waiter};

/// Lowercase fragments whose presence marks a refusal
pub const REFUSAL_VOCABULARY: [&str; 3] = ["refus", "no insurance", "cannot provide"];

/// Values the quote field holds before a real quote lands
const PLACEHOLDER_PATTERN: &str = r"^\s*\$?\s*0*\s*$";

/// The classified result of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// A quote was produced; carries the quote field's trimmed value
    Accepted(String),
    /// The application declined to quote
    Refused,
    /// Validation stopped the submission; carries the flagged field's id
    Blocked(String),
    /// No quote, no refusal, no flagged field
    Indeterminate,
}

impl Outcome {
    /// The quoted value, for accepted outcomes
    #[must_use]
    pub fn quote(&self) -> Option<&str> {
        match self {
            Self::Accepted(value) => Some(value),
            _ => None,
        }
    }

    /// The flagged field's id, for blocked outcomes
    #[must_use]
    pub fn blocked_field(&self) -> Option<&str> {
        match self {
            Self::Blocked(field) => Some(field),
            _ => None,
        }
    }
}

/// Classifies the page state after a submission
#[derive(Debug, Clone)]
pub struct OutcomeClassifier {
    waiter: Waiter,
    probe: ValidationProbe,
}

impl Default for OutcomeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeClassifier {
    /// Classifier with the default wait budget for the quote field and
    /// the probe's default window for the blocked scan
    #[must_use]
    pub fn new() -> Self {
        Self {
            waiter: Waiter::new(),
            probe: ValidationProbe::new(),
        }
    }

    /// Classifier with one wait budget shared by the quote wait and the
    /// blocked-field scan
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self {
            waiter: Waiter::with_options(options),
            probe: ValidationProbe::with_options(options),
        }
    }

    /// Wait for the quote field and classify the submission.
    ///
    /// Refusal vocabulary is checked in the quote value first and then in
    /// the page body, so a refusal banner outside the quote field still
    /// classifies as [`Outcome::Refused`]. The body check only runs once
    /// a non-placeholder value is present.
    pub fn classify(&self, driver: &mut dyn Driver, form: &QuoteForm) -> Outcome {
        let visible = self.waiter.wait_until(|| {
            let Ok(el) = form.quote_chain().resolve(driver) else {
                return Ok(false);
            };
            driver.is_displayed(&el)
        });

        let value = if visible {
            form.quote_value(driver)
        } else {
            String::new()
        };

        if value.is_empty() || is_placeholder(&value) {
            debug!(%value, "no quote produced, scanning for flagged fields");
            return match self.probe.first_invalid(driver, form.fields()) {
                Some(field) => Outcome::Blocked(field),
                None => Outcome::Indeterminate,
            };
        }

        if contains_refusal(&value) {
            return Outcome::Refused;
        }
        let body = driver.page_text().unwrap_or_default();
        if contains_refusal(&body) {
            return Outcome::Refused;
        }

        debug!(quote = %value, "quote accepted");
        Outcome::Accepted(value)
    }
}

fn contains_refusal(text: &str) -> bool {
    let lowered = text.to_lowercase();
    REFUSAL_VOCABULARY
        .iter()
        .any(|fragment| lowered.contains(fragment))
}

fn is_placeholder(value: &str) -> bool {
    Regex::new(PLACEHOLDER_PATTERN).is_ok_and(|re| re.is_match(value))
}
