//! Fallback handling after a terminal submission failure
//!
//! Builds presentation-agnostic descriptors: a classified message plus an
//! ordered list of alternative actions, so a failed submission is never a
//! dead end. Also keeps a short in-memory log of recent failures.

use crate::clock::Clock;
use crate::config::FallbackContact;
use crate::error::{ErrorCategory, SubmissionError};
use crate::form::FormInput;
use crate::tracking::{track_quietly, Tracker};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};

const ERROR_LOG_CAPACITY: usize = 50;
const RECENT_ERRORS: usize = 10;

/// Where the failure happened; selects the set of alternatives offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureContext {
    ContactForm,
    Generic,
}

impl FailureContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureContext::ContactForm => "contact_form",
            FailureContext::Generic => "generic",
        }
    }
}

/// What the caller should do when an action is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTarget {
    /// Open a `mailto:` or `tel:` link
    OpenUrl(String),
    /// Submit this form again
    Retry(FormInput),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Email,
    Phone,
    Retry,
    Support,
}

/// One alternative offered to the visitor
#[derive(Clone)]
pub struct FallbackAction {
    pub kind: ActionKind,
    pub label: String,
    pub primary: bool,
    action: Arc<dyn Fn() -> ActionTarget + Send + Sync>,
}

impl FallbackAction {
    fn new(
        kind: ActionKind,
        label: impl Into<String>,
        primary: bool,
        action: impl Fn() -> ActionTarget + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            primary,
            action: Arc::new(action),
        }
    }

    /// Run the action
    pub fn invoke(&self) -> ActionTarget {
        (self.action)()
    }
}

impl fmt::Debug for FallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackAction")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("primary", &self.primary)
            .finish_non_exhaustive()
    }
}

/// Classified failure with alternatives
#[derive(Debug, Clone)]
pub struct FallbackDescriptor {
    pub category: ErrorCategory,
    /// Classified, user-facing explanation
    pub message: String,
    /// Pre-written letter for the email alternative, when form data exists
    pub contact_message: Option<String>,
    pub actions: Vec<FallbackAction>,
}

impl FallbackDescriptor {
    pub fn primary_action(&self) -> Option<&FallbackAction> {
        self.actions.iter().find(|a| a.primary)
    }
}

/// Entry of the in-memory failure log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub category: ErrorCategory,
    pub message: String,
    pub context: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the failure log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSummary {
    pub total: usize,
    pub recent: Vec<ErrorRecord>,
    pub by_category: HashMap<ErrorCategory, usize>,
}

/// Builds fallback descriptors and records terminal failures
pub struct FallbackShell {
    contact: FallbackContact,
    tracker: Option<Arc<dyn Tracker>>,
    clock: Arc<dyn Clock>,
    log: Mutex<VecDeque<ErrorRecord>>,
}

impl FallbackShell {
    pub fn new(
        contact: FallbackContact,
        tracker: Option<Arc<dyn Tracker>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            contact,
            tracker,
            clock,
            log: Mutex::new(VecDeque::with_capacity(ERROR_LOG_CAPACITY)),
        }
    }

    pub fn contact(&self) -> &FallbackContact {
        &self.contact
    }

    /// Describe a terminal failure and the ways forward
    pub fn handle_terminal_failure(
        &self,
        error: &SubmissionError,
        context: FailureContext,
        form: Option<&FormInput>,
    ) -> FallbackDescriptor {
        let category = error.category();
        self.record(error, category, context);

        let message = user_message(error).to_string();
        match context {
            FailureContext::ContactForm => FallbackDescriptor {
                category,
                message,
                contact_message: form.map(contact_letter),
                actions: self.contact_form_actions(form),
            },
            FailureContext::Generic => FallbackDescriptor {
                category,
                message,
                contact_message: None,
                actions: self.generic_actions(form),
            },
        }
    }

    fn contact_form_actions(&self, form: Option<&FormInput>) -> Vec<FallbackAction> {
        let email_url = mailto(
            &self.contact.email,
            &email_subject(form),
            &form.map(contact_letter).unwrap_or_default(),
        );
        let has_form_data = form.is_some();
        let tracker = self.tracker.clone();
        let email = FallbackAction::new(ActionKind::Email, "Send Email Directly", true, move || {
            track_quietly(
                tracker.as_deref(),
                "fallback_contact",
                "email",
                json!({
                    "original_context": "contact_form_error",
                    "has_form_data": has_form_data,
                }),
            );
            ActionTarget::OpenUrl(email_url.clone())
        });

        let phone_url = format!("tel:{}", self.contact.phone);
        let phone_label = format!("Call Directly: {}", self.contact.phone_display);
        let tracker = self.tracker.clone();
        let phone = FallbackAction::new(ActionKind::Phone, phone_label, false, move || {
            track_quietly(
                tracker.as_deref(),
                "fallback_contact",
                "phone",
                json!({ "original_context": "contact_form_error" }),
            );
            ActionTarget::OpenUrl(phone_url.clone())
        });

        vec![email, phone, retry_action(form, false)]
    }

    fn generic_actions(&self, form: Option<&FormInput>) -> Vec<FallbackAction> {
        let support_url = mailto(
            &self.contact.email,
            "Technical Support Request",
            "Hi,\n\nI encountered an issue while using your website and need assistance.\n\nPlease contact me to help resolve this issue.\n\nThank you,",
        );
        let tracker = self.tracker.clone();
        let support = FallbackAction::new(ActionKind::Support, "Contact Support", false, move || {
            track_quietly(
                tracker.as_deref(),
                "support_contact",
                "email",
                json!({ "context": "error_fallback" }),
            );
            ActionTarget::OpenUrl(support_url.clone())
        });

        vec![retry_action(form, true), support]
    }

    fn record(&self, error: &SubmissionError, category: ErrorCategory, context: FailureContext) {
        track_quietly(
            self.tracker.as_deref(),
            "error",
            context.as_str(),
            json!({ "category": category.as_str(), "message": error.to_string() }),
        );

        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        if log.len() == ERROR_LOG_CAPACITY {
            log.pop_front();
        }
        log.push_back(ErrorRecord {
            category,
            message: error.to_string(),
            context: context.as_str(),
            timestamp: self.clock.now(),
        });
    }

    /// Totals and the most recent failures
    pub fn summary(&self) -> ErrorSummary {
        let log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        let mut by_category = HashMap::new();
        for record in log.iter() {
            *by_category.entry(record.category).or_insert(0) += 1;
        }
        ErrorSummary {
            total: log.len(),
            recent: log
                .iter()
                .skip(log.len().saturating_sub(RECENT_ERRORS))
                .cloned()
                .collect(),
            by_category,
        }
    }

    pub fn clear(&self) {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

fn retry_action(form: Option<&FormInput>, primary: bool) -> FallbackAction {
    let form = form.cloned().unwrap_or_default();
    FallbackAction::new(ActionKind::Retry, "Try Again", primary, move || {
        ActionTarget::Retry(form.clone())
    })
}

/// Classified wording shown to the visitor
pub fn user_message(error: &SubmissionError) -> &'static str {
    match error.status() {
        Some(429) => return "Too many requests. Please wait a moment and try again.",
        Some(404) => return "The contact service could not be found. Please use one of the alternative contact methods below.",
        _ => {}
    }
    match error.category() {
        ErrorCategory::Network => "We couldn't reach our servers. Please check your network connection and try again, or use one of the alternative contact methods below.",
        ErrorCategory::Server => "Our server ran into a problem while sending your message. Please try again shortly, or use one of the alternative contact methods below.",
        ErrorCategory::Validation => "Some of the information you entered needs attention. Please review the form and try again.",
        ErrorCategory::Unknown => "There was an issue submitting your message. Please try one of the alternative contact methods below.",
    }
}

fn email_subject(form: Option<&FormInput>) -> String {
    match form.map(|f| f.interested_in.as_str()).filter(|s| !s.is_empty()) {
        Some(topic) => format!("Inquiry about {topic}"),
        None => "General Inquiry".to_string(),
    }
}

/// Letter pre-filled into the email alternative
pub fn contact_letter(form: &FormInput) -> String {
    let name = form.full_name();
    format!(
        "Hi,\n\nMy name is {name} from {company}.\n\nI'm interested in {topic}.\n\n{message}\n\nBest regards,\n{name}",
        company = form.company,
        topic = form.interested_in,
        message = form.message,
    )
}

/// `mailto:` link with percent-encoded subject and body
pub fn mailto(address: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{address}?subject={}&body={}",
        encode_component(subject),
        encode_component(body)
    )
}

/// Percent-encode everything except RFC 3986 unreserved characters and `!*'()`
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'~'
            | b'!'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
