//! Store error types.

use std::path::PathBuf;

use contango_types::ContangoError;
use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database driver error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failed to create the database directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A stored column held a value outside its enumeration.
    #[error("Invalid value '{value}' in column {column}")]
    InvalidValue {
        /// Column name.
        column: &'static str,
        /// The offending value.
        value: String,
    },

    /// Security row vanished between insert and select.
    #[error("Security not found: {0}")]
    SecurityNotFound(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for ContangoError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
