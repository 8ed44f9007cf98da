mod config;
mod file;
mod memory;

pub use config::Config;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{ConfigError, StoreError};

/// Key/value persistence collaborator. Values are JSON text.
///
/// Each `set` replaces the whole value stored under `key`.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Returns `~/.config/nudge[-dev]/` based on NUDGE_ENV.
///
/// Set NUDGE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("NUDGE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("nudge-dev")
    } else {
        base_dir.join("nudge")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
