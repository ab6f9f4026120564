//! User notification surface
//!
//! Presentation lives outside this crate; only the message, its kind and
//! its dismissal behaviour cross this boundary.

use std::time::Duration;

/// Default display time for auto-dismissed notifications
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(5000);

/// Kind of notification shown to the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

/// Surface for success and error text
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NotificationKind, auto_dismiss: bool, duration: Duration);
}

/// Notifier that writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, kind: NotificationKind, auto_dismiss: bool, duration: Duration) {
        match kind {
            NotificationKind::Error | NotificationKind::Warning => tracing::warn!(
                kind = kind.as_str(),
                auto_dismiss,
                duration_ms = duration.as_millis() as u64,
                "{message}"
            ),
            NotificationKind::Success | NotificationKind::Info => tracing::info!(
                kind = kind.as_str(),
                auto_dismiss,
                duration_ms = duration.as_millis() as u64,
                "{message}"
            ),
        }
    }
}
