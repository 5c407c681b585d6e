//! Cotizar: Browser Acceptance Harness for the Insurance Quote Form
//!
//! Cotizar (Spanish: "to quote a price") drives a vehicle-insurance quote
//! web form end to end and classifies what the application did with each
//! submission. It is built for pages that render asynchronously: every
//! time-based coordination is a polling wait, and every element lookup
//! runs through an ordered chain of fallback locator strategies.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     COTIZAR Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Form /     │    │ Driver     │            │
//! │   │ (fill,     │───►│ Probe /    │───►│ (browser   │            │
//! │   │  submit)   │    │ Classifier │    │  handle)   │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         all waits polled through Waiter, no bare sleeps         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A scenario opens a [`Session`], boots into the form with
//! [`NavigationBootstrapper`], fills a [`FormState`] through [`QuoteForm`],
//! submits, and hands the page to [`OutcomeClassifier`], which reports
//! [`Outcome::Accepted`], [`Outcome::Refused`], [`Outcome::Blocked`] or
//! [`Outcome::Indeterminate`].

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod driver;
mod field;
mod form;
mod locator;
pub mod mock;
mod navigation;
mod outcome;
mod probe;
mod result;
mod session;
mod wait;

pub use driver::{Driver, ElementHandle, BLUR_SCRIPT, NATIVE_INVALID_SCRIPT};
pub use field::{FieldDescriptor, FieldKind, FormState, ERROR_SIBLING_XPATH};
pub use form::{QuoteForm, QUOTE_FIELD_ID, SUBMIT_ID};
pub use locator::{LocatorChain, Strategy};
pub use navigation::NavigationBootstrapper;
pub use outcome::{Outcome, OutcomeClassifier, REFUSAL_VOCABULARY};
pub use probe::{ValidationProbe, ValidationSignal, DEFAULT_PROBE_TIMEOUT_MS};
pub use result::{CotizarError, CotizarResult};
pub use session::Session;
pub use wait::{WaitOptions, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
