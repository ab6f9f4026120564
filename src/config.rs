//! Configuration handling for the relay pipeline

use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default relay endpoint
const DEFAULT_RELAY_URL: &str = "https://api.web3forms.com/submit";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_FALLBACK_EMAIL: &str = "michael@trustml.studio";
const DEFAULT_FALLBACK_PHONE: &str = "+15551234567";
const DEFAULT_FALLBACK_PHONE_DISPLAY: &str = "+1 (555) 123-4567";

/// On-disk configuration; every field optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RelayConfig {
    /// Relay endpoint URL
    pub relay_url: Option<String>,
    /// Relay access/routing token
    pub access_key: Option<String>,
    /// Total submission attempts, including the first
    pub max_attempts: Option<u32>,
    /// Base delay between attempts in milliseconds
    pub retry_delay_ms: Option<u64>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Address offered when submission fails
    pub fallback_email: Option<String>,
    /// Dialable phone number offered when submission fails
    pub fallback_phone: Option<String>,
    /// Human-readable form of the fallback phone number
    pub fallback_phone_display: Option<String>,
    /// Directory holding saved drafts
    pub draft_dir: Option<PathBuf>,
}

/// Alternate contact channel offered after a terminal failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackContact {
    pub email: String,
    pub phone: String,
    pub phone_display: String,
}

impl Default for FallbackContact {
    fn default() -> Self {
        Self {
            email: DEFAULT_FALLBACK_EMAIL.to_string(),
            phone: DEFAULT_FALLBACK_PHONE.to_string(),
            phone_display: DEFAULT_FALLBACK_PHONE_DISPLAY.to_string(),
        }
    }
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub relay_url: String,
    pub access_key: String,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub fallback: FallbackContact,
    pub draft_dir: Option<PathBuf>,
}

impl RelayConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("studio", "trustml", "contact-relay")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Default location for saved drafts
    pub fn default_draft_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join("drafts"))
    }

    /// Load configuration from the user config file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: RelayConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply `CONTACT_RELAY_URL` and `CONTACT_RELAY_ACCESS_KEY` overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("CONTACT_RELAY_URL") {
            self.relay_url = Some(url);
        }
        if let Ok(key) = std::env::var("CONTACT_RELAY_ACCESS_KEY") {
            self.access_key = Some(key);
        }
        self
    }

    /// Fill in defaults. Fails when no access key is configured.
    pub fn resolve(self) -> Result<RelaySettings> {
        let access_key = self
            .access_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("Relay access key not configured"))?;

        let defaults = FallbackContact::default();

        Ok(RelaySettings {
            relay_url: self
                .relay_url
                .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
            access_key,
            max_attempts: self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
            retry_delay: Duration::from_millis(
                self.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS),
            ),
            request_timeout: Duration::from_secs(
                self.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            fallback: FallbackContact {
                email: self.fallback_email.unwrap_or(defaults.email),
                phone: self.fallback_phone.unwrap_or(defaults.phone),
                phone_display: self
                    .fallback_phone_display
                    .unwrap_or(defaults.phone_display),
            },
            draft_dir: self.draft_dir.or_else(Self::default_draft_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();
        assert!(config.relay_url.is_none());
        assert!(config.access_key.is_none());
        assert!(config.max_attempts.is_none());
        assert!(config.retry_delay_ms.is_none());
        assert!(config.draft_dir.is_none());
    }

    #[test]
    fn test_resolve_requires_access_key() {
        assert!(RelayConfig::default().resolve().is_err());

        let config = RelayConfig {
            access_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.resolve().is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let config = RelayConfig {
            access_key: Some("key-123".to_string()),
            ..Default::default()
        };
        let settings = config.resolve().unwrap();

        assert_eq!(settings.relay_url, "https://api.web3forms.com/submit");
        assert_eq!(settings.access_key, "key-123");
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.retry_delay, Duration::from_millis(1000));
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
        assert_eq!(settings.fallback, FallbackContact::default());
    }

    #[test]
    fn test_resolve_clamps_zero_attempts() {
        let config = RelayConfig {
            access_key: Some("key".to_string()),
            max_attempts: Some(0),
            ..Default::default()
        };
        assert_eq!(config.resolve().unwrap().max_attempts, 1);
    }

    #[test]
    fn test_serialization() {
        let config = RelayConfig {
            relay_url: Some("http://localhost:8000/api/contact".to_string()),
            access_key: Some("key".to_string()),
            max_attempts: Some(5),
            retry_delay_ms: Some(250),
            fallback_email: Some("hello@example.com".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: RelayConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(
            parsed.relay_url,
            Some("http://localhost:8000/api/contact".to_string())
        );
        assert_eq!(parsed.max_attempts, Some(5));
        assert_eq!(parsed.retry_delay_ms, Some(250));
        assert_eq!(parsed.fallback_email, Some("hello@example.com".to_string()));
        assert!(parsed.fallback_phone.is_none());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        // Should ignore unknown fields
        let json = r#"{"max_attempts": 4, "unknown_field": "value"}"#;
        let parsed: RelayConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.max_attempts, Some(4));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.relay_url.is_none());
        assert!(config.access_key.is_none());
    }

    #[test]
    fn test_save_then_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = RelayConfig {
            access_key: Some("key".to_string()),
            fallback_phone_display: Some("+44 20 7946 0000".to_string()),
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        let loaded = RelayConfig::load_from(&path).unwrap();

        assert_eq!(loaded.access_key, Some("key".to_string()));
        assert_eq!(
            loaded.fallback_phone_display,
            Some("+44 20 7946 0000".to_string())
        );
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(RelayConfig::load_from(&path).is_err());
    }
}
