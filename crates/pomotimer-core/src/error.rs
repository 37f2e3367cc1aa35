//! Core error types for pomotimer-core.
//!
//! Errors are split per concern with thiserror. Note that the store adapter
//! never surfaces serialization failures through these types: it logs them
//! and reports an explicit outcome instead (see [`crate::storage::ReadOutcome`]).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomotimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value backend errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Display string parsing errors
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Key-value backend errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Store is locked")]
    Locked,

    /// The data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
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

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors produced when parsing an `M:SS` display string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("expected 'M:SS', got '{0}'")]
    MissingSeparator(String),

    #[error("'{0}' is not a whole number")]
    NotANumber(String),

    #[error("seconds must be below 60, got {0}")]
    SecondsOutOfRange(u64),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
