//! Error types for the store helpers
//!
//! Provides unified error handling using thiserror. Client errors from the
//! external stores pass through untouched; nothing here retries.

use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for the crate.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error reported by the Redis client
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Error reported by the MongoDB driver
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Network failure while fetching a page
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Command used against a key holding another kind of value
    #[error("Wrong type for key: {0}")]
    WrongType(String),

    /// Stored bytes could not be converted to the requested type
    #[error("Decode error: {0}")]
    Decode(String),

    /// Document lacks a field the helper iterates over
    #[error("Missing field '{0}' in document")]
    MissingField(String),

    /// Failure writing replay or report output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
