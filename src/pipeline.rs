//! The form submission pipeline
//!
//! Wires validation, the relay client, the retry policy, draft persistence
//! and the fallback shell together. All collaborators are injected, so a
//! pipeline can be built over mocks as easily as over the real relay.

use crate::clock::Clock;
use crate::config::{FallbackContact, RelaySettings};
use crate::draft::{DraftStore, Drafts};
use crate::error::SubmissionError;
use crate::fallback::{FailureContext, FallbackDescriptor, FallbackShell};
use crate::form::{validate, FormInput};
use crate::notify::{NotificationKind, Notifier, DEFAULT_NOTIFICATION_DURATION};
use crate::relay::{SubmissionClient, SubmissionId};
use crate::retry::RetryPolicy;
use crate::tracking::{
    interaction_metadata, submission_metadata, track_quietly, SubmissionStage, Tracker,
    CONTACT_FORM_ID,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Confirmation shown after a successful submission
pub const SUCCESS_MESSAGE: &str =
    "Thank you for your message! We'll get back to you within 24 hours.";

const FAILURE_NOTICE: &str =
    "There was an issue submitting your message. Please try one of the alternative contact methods below.";

/// Per-call switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    pub show_success_message: bool,
    pub track_submission: bool,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            show_success_message: true,
            track_submission: true,
        }
    }
}

/// Result of one `submit` call, as seen by the UI layer
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// The relay accepted the form
    Submitted { id: SubmissionId, message: &'static str },
    /// Input failed validation; nothing was sent
    Invalid { errors: Vec<String> },
    /// Retries exhausted or a non-retryable error occurred
    Failed {
        error: SubmissionError,
        fallback: FallbackDescriptor,
    },
    /// Another submission through this pipeline has not finished yet
    AlreadyInFlight,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Submitted { .. })
    }
}

/// Clears the in-flight flag when a submission ends, however it ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Builder-style construction of a [`FormSubmissionPipeline`]
pub struct PipelineBuilder {
    client: Arc<dyn SubmissionClient>,
    store: Arc<dyn DraftStore>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    contact: FallbackContact,
    tracker: Option<Arc<dyn Tracker>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl PipelineBuilder {
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn fallback_contact(mut self, contact: FallbackContact) -> Self {
        self.contact = contact;
        self
    }

    /// Apply retry and fallback values from resolved settings
    pub fn settings(self, settings: &RelaySettings) -> Self {
        self.retry_policy(RetryPolicy::new(settings.max_attempts, settings.retry_delay))
            .fallback_contact(settings.fallback.clone())
    }

    pub fn tracker(mut self, tracker: Arc<dyn Tracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> FormSubmissionPipeline {
        FormSubmissionPipeline {
            client: self.client,
            retry: self.retry,
            drafts: Drafts::new(self.store, self.clock.clone()),
            fallback: FallbackShell::new(self.contact, self.tracker.clone(), self.clock),
            tracker: self.tracker,
            notifier: self.notifier,
            in_flight: AtomicBool::new(false),
        }
    }
}

/// Validation, submission with retry, fallback and draft handling
pub struct FormSubmissionPipeline {
    client: Arc<dyn SubmissionClient>,
    retry: RetryPolicy,
    drafts: Drafts,
    fallback: FallbackShell,
    tracker: Option<Arc<dyn Tracker>>,
    notifier: Option<Arc<dyn Notifier>>,
    in_flight: AtomicBool,
}

impl FormSubmissionPipeline {
    /// Start building a pipeline over the given relay client, store and clock
    pub fn builder(
        client: Arc<dyn SubmissionClient>,
        store: Arc<dyn DraftStore>,
        clock: Arc<dyn Clock>,
    ) -> PipelineBuilder {
        PipelineBuilder {
            client,
            store,
            clock,
            retry: RetryPolicy::default(),
            contact: FallbackContact::default(),
            tracker: None,
            notifier: None,
        }
    }

    pub fn drafts(&self) -> &Drafts {
        &self.drafts
    }

    pub fn fallback(&self) -> &FallbackShell {
        &self.fallback
    }

    /// Save the current input as the draft
    pub fn save_draft(&self, input: &FormInput) {
        self.drafts.save(input);
    }

    /// Draft to restore when the form mounts
    pub fn load_draft(&self) -> Option<FormInput> {
        self.drafts.load()
    }

    pub fn clear_draft(&self) {
        self.drafts.clear();
    }

    /// Report a focus/change/blur on a single field
    pub fn track_form_interaction(&self, action: &str, field: &str, metadata: Value) {
        track_quietly(
            self.tracker.as_deref(),
            "form_interaction",
            &format!("{CONTACT_FORM_ID}-{field}"),
            interaction_metadata(action, field, metadata),
        );
    }

    /// Submit with default options
    pub async fn submit(&self, input: &FormInput) -> SubmissionOutcome {
        self.submit_with(input, SubmitOptions::default()).await
    }

    /// Submit the form, retrying transient failures and falling back on terminal ones
    pub async fn submit_with(&self, input: &FormInput, options: SubmitOptions) -> SubmissionOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!("Submission already in flight, ignoring");
            return SubmissionOutcome::AlreadyInFlight;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let validation = validate(input);
        if !validation.is_valid() {
            self.track_stage(input, SubmissionStage::Error, options);
            if let Some(message) = validation.message() {
                self.notify(&message, NotificationKind::Error);
            }
            return SubmissionOutcome::Invalid {
                errors: validation.into_errors(),
            };
        }

        self.track_stage(input, SubmissionStage::Attempt, options);

        match self.retry.submit_with_retry(self.client.as_ref(), input).await {
            Ok(id) => {
                self.track_stage(input, SubmissionStage::Success, options);
                if options.show_success_message {
                    self.notify(SUCCESS_MESSAGE, NotificationKind::Success);
                }
                self.drafts.clear();
                SubmissionOutcome::Submitted {
                    id,
                    message: SUCCESS_MESSAGE,
                }
            }
            Err(SubmissionError::Validation(errors)) => {
                self.track_stage(input, SubmissionStage::Error, options);
                SubmissionOutcome::Invalid { errors }
            }
            Err(error) => {
                self.track_stage(input, SubmissionStage::Error, options);
                self.notify(FAILURE_NOTICE, NotificationKind::Error);
                let fallback = self.fallback.handle_terminal_failure(
                    &error,
                    FailureContext::ContactForm,
                    Some(input),
                );
                SubmissionOutcome::Failed { error, fallback }
            }
        }
    }

    fn track_stage(&self, input: &FormInput, stage: SubmissionStage, options: SubmitOptions) {
        if !options.track_submission {
            return;
        }
        track_quietly(
            self.tracker.as_deref(),
            "form_submission",
            CONTACT_FORM_ID,
            submission_metadata(input, stage),
        );
    }

    fn notify(&self, message: &str, kind: NotificationKind) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(message, kind, true, DEFAULT_NOTIFICATION_DURATION);
        }
    }
}
