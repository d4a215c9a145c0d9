//! User settings with persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use newdle_fetch::{ClientSettings, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json_or_default, save_json};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Settings
// ============================================================================

/// Persisted client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root URL of the newdle server.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Log level when neither `--verbose` nor `--quiet` is given.
    pub log_level: LogLevel,
    /// Keep the session token on disk between runs.
    pub persist_token: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: LogLevel::default(),
            persist_token: true,
        }
    }
}

impl Settings {
    /// Converts into the settings the request layer consumes.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::new(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    /// Checks that the settings can be used to build a client.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout must be positive".to_string()));
        }
        self.client_settings()
            .parsed_base_url()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(())
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store with change notifications.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl SettingsStore {
    /// Creates a store with default settings.
    pub fn new(path: PathBuf) -> Self {
        Self::with_settings(path, Settings::default())
    }

    fn with_settings(path: PathBuf, settings: Settings) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path. Missing or corrupt files yield defaults.
    pub async fn load(path: PathBuf) -> Self {
        debug!(path = %path.display(), "Loading settings");
        let settings = load_json_or_default(&path).await;
        Self::with_settings(path, settings)
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the token file path, next to the settings file.
    pub fn token_path(&self) -> PathBuf {
        self.path.with_file_name("token")
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings and notifies subscribers.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            f(&mut settings);
        }
        self.notify_change().await;
    }

    /// Sets the server URL after validating it.
    pub async fn set_base_url(&self, base_url: &str) -> Result<(), StoreError> {
        let candidate = Settings {
            base_url: base_url.to_string(),
            ..self.get().await
        };
        candidate.validate()?;
        self.update(|s| s.base_url = candidate.base_url).await;
        Ok(())
    }

    /// Saves settings to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    /// Notifies subscribers of a change.
    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.log_level, LogLevel::Warn);
        assert!(settings.persist_token);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_client_settings() {
        let settings = Settings {
            base_url: "https://newdle.example.com".to_string(),
            timeout_secs: 5,
            ..Settings::default()
        };
        let client = settings.client_settings();
        assert_eq!(client.timeout, Duration::from_secs(5));
        assert_eq!(
            client.parsed_base_url().unwrap().as_str(),
            "https://newdle.example.com/"
        );
    }

    #[test]
    fn test_validate() {
        let zero = Settings {
            timeout_secs: 0,
            ..Settings::default()
        };
        assert!(matches!(zero.validate(), Err(StoreError::Config(_))));

        let bad_url = Settings {
            base_url: "newdle".to_string(),
            ..Settings::default()
        };
        assert!(bad_url.validate().is_err());
    }

    #[tokio::test]
    async fn test_set_base_url() {
        let store = SettingsStore::new(PathBuf::from("/nonexistent/settings.json"));
        let mut rx = store.subscribe();

        assert!(store.set_base_url("not a url").await.is_err());
        assert!(!rx.has_changed().unwrap());

        store.set_base_url("https://newdle.example.com").await.unwrap();
        assert!(rx.has_changed().unwrap());
        rx.mark_unchanged();
        assert_eq!(store.get().await.base_url, "https://newdle.example.com");
    }

    #[test]
    fn test_token_path_next_to_settings() {
        let store = SettingsStore::new(PathBuf::from("/cfg/newdle/settings.json"));
        assert_eq!(store.token_path(), PathBuf::from("/cfg/newdle/token"));
    }
}
