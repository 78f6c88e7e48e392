//! Error types for filedrop.

use thiserror::Error;

/// Common error type for filedrop.
#[derive(Error, Debug)]
pub enum FiledropError {
    /// I/O error from the storage directory or the listener.
    ///
    /// The message is passed through untouched so that HTTP clients see the
    /// same text the operating system reported.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for client input.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for filedrop operations.
pub type Result<T> = std::result::Result<T, FiledropError>;
