//! Durations persistence.
//!
//! Durations are stored as a flat JSON object at
//! `<config_dir>/pomodoro/pomodoro_config.json`. Loading never fails: a
//! missing or unreadable file yields the defaults so the daemon always
//! starts.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::types::Durations;

/// Directory under the user config dir.
const CONFIG_DIR_NAME: &str = "pomodoro";

/// Config file name.
const CONFIG_FILE_NAME: &str = "pomodoro_config.json";

// ============================================================================
// ConfigError
// ============================================================================

/// Errors that can occur while saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory could be determined
    #[error("Could not determine the config directory")]
    NoConfigDir,

    /// Filesystem error
    #[error("Failed to write config {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Serialization error
    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

// ============================================================================
// ConfigStore
// ============================================================================

/// Loads and saves `Durations` at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store at the default location.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` if the platform has no config dir.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self::with_path(Self::default_path()?))
    }

    /// Creates a store at a custom path (useful for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads durations, substituting defaults for anything unusable.
    pub fn load(&self) -> Durations {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                return Durations::default();
            }
            Err(e) => {
                warn!("Failed to read {}: {}, using defaults", self.path.display(), e);
                return Durations::default();
            }
        };

        match serde_json::from_str(&data) {
            Ok(durations) => durations,
            Err(e) => {
                warn!("Malformed config {}: {}, using defaults", self.path.display(), e);
                Durations::default()
            }
        }
    }

    /// Saves durations, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, durations: &Durations) -> Result<(), ConfigError> {
        let io_err = |e: std::io::Error| ConfigError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(durations)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(io_err)?;

        debug!("Saved config to {}", self.path.display());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
