//! Contact Relay - resilient contact-form submission
//!
//! Validates a contact form, posts it to a third-party form relay with
//! bounded retries, and falls back to alternate contact channels when the
//! relay cannot be reached. Unsent input is kept as a local draft.

pub mod clock;
pub mod config;
pub mod draft;
pub mod error;
pub mod fallback;
pub mod form;
pub mod notify;
pub mod pipeline;
pub mod relay;
pub mod retry;
pub mod tracking;

pub use error::{ErrorCategory, StorageError, SubmissionError, TrackingError};
pub use form::{validate, FormInput, ValidationResult};
pub use pipeline::{FormSubmissionPipeline, SubmissionOutcome, SubmitOptions};
pub use relay::{HttpRelay, SubmissionClient, SubmissionId};
pub use retry::RetryPolicy;
