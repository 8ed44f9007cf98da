//! Core error types for nudge-core.
//!
//! A single [`CoreError`] is returned from every fallible operation in the
//! library. Store implementations report failures through [`StoreError`],
//! which the catalog wraps into [`CoreError::PersistenceFailed`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for nudge-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Attempted to begin a survey with no questions defined.
    #[error("Cannot begin a survey: no questions are defined")]
    EmptyQuestionSet,

    /// A mutation referenced an id that is not in the collection.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// Writing a collection to the store failed. In-memory state is unchanged.
    #[error("Failed to persist '{key}': {source}")]
    PersistenceFailed {
        key: String,
        #[source]
        source: StoreError,
    },

    /// Input rejected before any mutation took place.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A survey command was issued in a state that does not accept it.
    #[error("Cannot {action} while survey is {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    /// A stored blob could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Which collection an id lookup failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    Question,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Task => f.write_str("Task"),
            EntityKind::Question => f.write_str("Question"),
        }
    }
}

/// Errors reported by [`Store`](crate::storage::Store) implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing store refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Could not resolve or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty after trimming.
    #[error("'{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// An id already exists in the collection.
    #[error("{kind} id '{id}' already exists")]
    DuplicateId { kind: &'static str, id: String },

    /// A question is already bound to this property.
    #[error("Property '{0}' already has a question")]
    DuplicateProperty(String),
}

impl CoreError {
    pub(crate) fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn persistence(key: &str, source: StoreError) -> Self {
        CoreError::PersistenceFailed {
            key: key.to_string(),
            source,
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
