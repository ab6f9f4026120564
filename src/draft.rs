//! Local draft persistence
//!
//! A draft is the last snapshot of the form plus the time it was saved,
//! kept under a single key so unsent input survives a reload. Every storage
//! failure is logged and swallowed here; callers never see one.

use crate::clock::Clock;
use crate::error::StorageError;
use crate::form::FormInput;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Storage key for the contact form draft
pub const DRAFT_KEY: &str = "contact_form_draft";

/// Drafts at least this old are discarded on load
pub fn draft_ttl() -> Duration {
    Duration::hours(24)
}

/// Synchronous key/value store, one value per key
pub trait DraftStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl DraftStore for FileDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Persisted shape: the form fields plus `saved_at`
#[derive(Debug, Serialize, Deserialize)]
struct DraftRecord {
    #[serde(flatten)]
    input: FormInput,
    #[serde(default)]
    saved_at: Option<String>,
}

/// Save/restore of the form draft over a [`DraftStore`]
#[derive(Clone)]
pub struct Drafts {
    store: Arc<dyn DraftStore>,
    clock: Arc<dyn Clock>,
}

impl Drafts {
    pub fn new(store: Arc<dyn DraftStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Overwrite the saved draft with `input`
    pub fn save(&self, input: &FormInput) {
        let record = DraftRecord {
            input: input.clone(),
            saved_at: Some(self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        let result = serde_json::to_string(&record)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(DRAFT_KEY, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to save form draft");
        }
    }

    /// Restore the saved draft, discarding it once it has expired
    pub fn load(&self) -> Option<FormInput> {
        let raw = match self.store.get(DRAFT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load form draft");
                return None;
            }
        };

        let record: DraftRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Saved form draft is corrupt");
                return None;
            }
        };

        let saved_at = record
            .saved_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        match saved_at {
            Some(saved_at) if self.clock.now() - saved_at < draft_ttl() => Some(record.input),
            _ => {
                tracing::debug!("Discarding expired form draft");
                self.clear();
                None
            }
        }
    }

    /// Remove the saved draft
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(DRAFT_KEY) {
            tracing::warn!(error = %e, "Failed to clear form draft");
        }
    }
}
