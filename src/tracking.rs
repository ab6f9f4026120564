//! Analytics sink abstraction
//!
//! Tracking is fire-and-forget: failures are logged at `warn` and dropped.

use crate::error::TrackingError;
use crate::form::FormInput;
use serde_json::{json, Value};

/// Element id used for all contact form events
pub const CONTACT_FORM_ID: &str = "contact-form";

/// Stage of a submission reported to the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Attempt,
    Success,
    Error,
}

impl SubmissionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStage::Attempt => "attempt",
            SubmissionStage::Success => "success",
            SubmissionStage::Error => "error",
        }
    }
}

/// Analytics collector
#[cfg_attr(test, mockall::automock)]
pub trait Tracker: Send + Sync {
    fn track(&self, event: &str, element_id: &str, metadata: Value) -> Result<(), TrackingError>;
}

/// Tracker that writes events to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracker;

impl Tracker for LogTracker {
    fn track(&self, event: &str, element_id: &str, metadata: Value) -> Result<(), TrackingError> {
        tracing::info!(event, element_id, %metadata, "Tracked event");
        Ok(())
    }
}

/// Send an event if a tracker is present, discarding any failure
pub fn track_quietly(tracker: Option<&dyn Tracker>, event: &str, element_id: &str, metadata: Value) {
    let Some(tracker) = tracker else {
        return;
    };
    if let Err(e) = tracker.track(event, element_id, metadata) {
        tracing::warn!(event, element_id, error = %e, "Dropping tracking event");
    }
}

/// Sanitised metadata for a `form_submission` event. No field values are included.
pub fn submission_metadata(input: &FormInput, stage: SubmissionStage) -> Value {
    let fields = input.filled_fields();
    let service = input
        .service_type
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&input.interested_in);

    json!({
        "form_fields": fields,
        "field_count": fields.len(),
        "has_email": !input.email.is_empty(),
        "message_length": input.message.chars().count(),
        "service_type": service,
        "result": stage.as_str(),
    })
}

/// Metadata for a `form_interaction` event
pub fn interaction_metadata(action: &str, field: &str, extra: Value) -> Value {
    let mut metadata = json!({ "action": action, "field": field });
    if let (Some(target), Value::Object(extra)) = (metadata.as_object_mut(), extra) {
        for (key, value) in extra {
            target.insert(key, value);
        }
    }
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_track_quietly_swallows_errors() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_track()
            .times(1)
            .returning(|_, _, _| Err(TrackingError("collector offline".into())));

        track_quietly(Some(&tracker), "form_submission", CONTACT_FORM_ID, json!({}));
    }

    #[test]
    fn test_track_quietly_without_tracker() {
        track_quietly(None, "form_submission", CONTACT_FORM_ID, json!({}));
    }

    #[test]
    fn test_track_quietly_forwards() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_track()
            .with(eq("form_interaction"), eq("contact-form-email"), eq(json!({"a": 1})))
            .times(1)
            .returning(|_, _, _| Ok(()));

        track_quietly(
            Some(&tracker),
            "form_interaction",
            "contact-form-email",
            json!({"a": 1}),
        );
    }

    #[test]
    fn test_submission_metadata_has_no_values() {
        let input = FormInput {
            first_name: "John".into(),
            email: "john@example.com".into(),
            message: "Hello there".into(),
            interested_in: "Risk Strategy".into(),
            ..Default::default()
        };

        let metadata = submission_metadata(&input, SubmissionStage::Attempt);

        assert_eq!(metadata["field_count"], 4);
        assert_eq!(metadata["has_email"], true);
        assert_eq!(metadata["message_length"], 11);
        assert_eq!(metadata["service_type"], "Risk Strategy");
        assert_eq!(metadata["result"], "attempt");
        assert!(!metadata.to_string().contains("john@example.com"));
    }

    #[test]
    fn test_interaction_metadata_merges_extra() {
        let metadata = interaction_metadata("focus", "email", json!({"source": "form"}));
        assert_eq!(
            metadata,
            json!({"action": "focus", "field": "email", "source": "form"})
        );
    }
}
