//! Error types for filestash.

use thiserror::Error;

/// Common error type for filestash.
#[derive(Error, Debug)]
pub enum StashError {
    /// Database error.
    ///
    /// Wraps any failure reported by the record store. Errors from sqlx are
    /// converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error from the blob store or the local filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for StashError {
    fn from(e: sqlx::Error) -> Self {
        StashError::Database(e.to_string())
    }
}

/// Result type alias for filestash operations.
pub type Result<T> = std::result::Result<T, StashError>;
