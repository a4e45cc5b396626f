//! Shared error type for the Press crates

use thiserror::Error;

/// Common result type for Press operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures from database access, the filesystem and configuration
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data that can't be interpreted
    #[error("Internal error: {0}")]
    Internal(String),
}
