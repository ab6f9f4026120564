//! Retry policy around the relay client
//!
//! Validation always runs first and invalid input never reaches the network.
//! Retryable failures (network, timeout, 5xx) are re-attempted with a linear
//! back-off of `delay * (attempt + 1)` until `max_attempts` calls have been made.

use crate::error::SubmissionError;
use crate::form::{validate, FormInput};
use crate::relay::{SubmissionClient, SubmissionId};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Whether `error` is worth another attempt
pub fn should_retry(error: &SubmissionError) -> bool {
    error.is_retryable()
}

/// Bounded linear-back-off retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

/// Per-call bookkeeping, dropped when the call returns
struct RetryState {
    attempt: u32,
    last_error: Option<SubmissionError>,
}

impl RetryPolicy {
    /// `max_attempts` counts the first call; zero is treated as one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the attempt following `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.delay * (attempt + 1)
    }

    /// Validate, submit, and retry transient failures
    pub async fn submit_with_retry(
        &self,
        client: &dyn SubmissionClient,
        input: &FormInput,
    ) -> Result<SubmissionId, SubmissionError> {
        let validation = validate(input);
        if !validation.is_valid() {
            return Err(SubmissionError::Validation(validation.into_errors()));
        }

        let correlation_id = Uuid::new_v4();
        let span = tracing::info_span!("submission", %correlation_id);
        self.run(client, input).instrument(span).await
    }

    async fn run(
        &self,
        client: &dyn SubmissionClient,
        input: &FormInput,
    ) -> Result<SubmissionId, SubmissionError> {
        let mut state = RetryState {
            attempt: 0,
            last_error: None,
        };

        loop {
            tracing::debug!(attempt = state.attempt, "Submitting to relay");

            let error = match client.submit(input).await {
                Ok(id) => {
                    tracing::info!(attempt = state.attempt, %id, "Submission accepted");
                    return Ok(id);
                }
                Err(e) => e,
            };

            let retryable = should_retry(&error);
            let remaining = state.attempt + 1 < self.max_attempts;
            tracing::warn!(
                attempt = state.attempt,
                retryable,
                error = %error,
                "Submission attempt failed"
            );

            if !retryable || !remaining {
                state.last_error = Some(error);
                break;
            }

            let wait = self.backoff(state.attempt);
            state.last_error = Some(error);
            tokio::time::sleep(wait).await;
            state.attempt += 1;
        }

        match state.last_error {
            Some(error) => Err(error),
            None => Err(SubmissionError::Network("no attempt was made".into())),
        }
    }
}
