//! TOML-based application configuration.
//!
//! Stores tunables for:
//! - How many matches the results list shows
//! - How many finished surveys are kept
//! - Whether an empty store is seeded with the sample catalog
//! - Where catalog files live
//!
//! Configuration is stored at `~/.config/nudge/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Length of the "top matches" list.
    #[serde(default = "default_top_matches")]
    pub top_matches: usize,
    /// Finished surveys kept in history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Write the sample catalog when a key is missing.
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
    /// Catalog directory override. Defaults to the config directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

// Default functions
fn default_top_matches() -> usize {
    5
}
fn default_history_limit() -> usize {
    50
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top_matches: default_top_matches(),
            history_limit: default_history_limit(),
            seed_defaults: true,
            data_dir: None,
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing the default there if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Directory for catalog files.
    pub fn store_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => data_dir(),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }
}
