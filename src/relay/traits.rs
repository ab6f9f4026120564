//! Trait abstraction for the relay client to enable mocking in tests

use super::client::SubmissionId;
use crate::error::SubmissionError;
use crate::form::FormInput;
use async_trait::async_trait;

/// One outbound submission to the form relay
///
/// Implementations make exactly one network call per invocation and never
/// retry on their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// Submit the form and return the relay-assigned identifier
    async fn submit(&self, input: &FormInput) -> Result<SubmissionId, SubmissionError>;
}
