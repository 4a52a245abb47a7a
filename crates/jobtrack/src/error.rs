use std::path::PathBuf;
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum JobtrackError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),
}

/// Errors returned by the stores. Every validation failure is detected
/// before any mutation, so an error always means "nothing changed".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Malformed or missing input, or a failed cross-reference check.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Uniqueness violation or id mismatch.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The target of the operation does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected storage failure. Carries a short message only.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        StoreError::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        StoreError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        StoreError::Conflict(message.into())
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            return StoreError::Conflict("duplicate value".to_string());
        }
        tracing::error!(error = %err, "storage failure");
        let short = match err {
            DatabaseError::Sqlite(_) => "storage engine error",
            DatabaseError::Io { .. } => "storage I/O error",
            DatabaseError::Migration { .. } => "schema not ready",
            DatabaseError::LockPoisoned => "storage unavailable",
        };
        StoreError::Internal(short.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        DatabaseError::from(err).into()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Missing file")]
    MissingFile,

    #[error("Unsupported file type. Allowed: pdf, doc, docx, txt.")]
    UnsupportedType,

    #[error("File too large ({size} bytes). Max {max} bytes.")]
    TooLarge { size: u64, max: u64 },

    #[error("Failed to store upload at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, JobtrackError>;
