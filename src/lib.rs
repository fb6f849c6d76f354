//! Headless core of the consult booking dialog.
//!
//! The host renders; this crate owns slot availability, form validation,
//! the submission lifecycle, and the keyboard and focus behaviour of the
//! dialog and its pickers.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::booking_form::{BookingFormController, SubmissionState, SubmitError};
pub use application::booking_widget::{BookingWidget, BookingWidgetView, Picker};
pub use application::bootstrap::{bootstrap_workspace, AppState};
pub use domain::validation::BookingError;
pub use infrastructure::error::InfraError;
