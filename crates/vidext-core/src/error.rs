//! Error types for the widget
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for widget operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the widget
#[derive(Error, Debug)]
pub enum Error {
    /// Field store-related errors (host rejected or failed a read/write)
    #[error("Field store error: {0}")]
    FieldStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from local stores
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The write-through worker is gone before a write settled
    #[error("Writer closed before {field} settled")]
    WriterClosed {
        /// Field whose write was lost
        field: String,
    },

    /// No async runtime available to host the writer
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a field store error
    pub fn field_store(msg: impl Into<String>) -> Self {
        Self::FieldStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a writer-closed error for a field
    pub fn writer_closed(field: impl Into<String>) -> Self {
        Self::WriterClosed {
            field: field.into(),
        }
    }

    /// Create a runtime error
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
