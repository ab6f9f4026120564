//! Error types for the submission pipeline
//!
//! Every outcome of a relay call is classified once, at the client boundary,
//! into [`SubmissionError`]. Retry and fallback logic only ever match on it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single submission or of a whole retry sequence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Input rejected locally, before any network call
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Transport failed to reach the relay at all
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The relay answered with a non-success status
    #[error("Server error: {status} {status_text}")]
    Server { status: u16, status_text: String },

    /// The relay answered with a success status but an unreadable body
    #[error("Unexpected relay response: {0}")]
    Parse(String),
}

impl SubmissionError {
    /// Creates a Server error
    pub fn server(status: u16, status_text: impl Into<String>) -> Self {
        Self::Server {
            status,
            status_text: status_text.into(),
        }
    }

    /// Whether re-sending the same request could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Server { status, .. } => *status >= 500,
            Self::Validation(_) | Self::Parse(_) => false,
        }
    }

    /// User-facing classification of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) | Self::Timeout(_) => ErrorCategory::Network,
            Self::Server { status, .. } if *status >= 500 => ErrorCategory::Server,
            Self::Server { .. } | Self::Validation(_) => ErrorCategory::Validation,
            Self::Parse(_) => ErrorCategory::Unknown,
        }
    }

    /// HTTP status, when the relay was reached
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Coarse error class used to pick user-facing wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Network,
    Server,
    Validation,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

/// Draft storage failure. Always caught and logged by the caller of the store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage disabled, full or otherwise refusing writes
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Analytics sink failure. Never surfaced to the submitter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Tracking failed: {0}")]
pub struct TrackingError(pub String);
