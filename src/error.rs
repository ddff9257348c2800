//! Error types for the durable tier
//!
//! Provides unified error handling using thiserror. None of these errors
//! leave the public cache API; the manager logs them and carries on with
//! the volatile tier.

use thiserror::Error;

// == Durable Error Enum ==
/// Failure while talking to a durable storage backend.
#[derive(Error, Debug)]
pub enum DurableError {
    /// Storage disabled, access denied, or otherwise not reachable
    #[error("Durable storage unavailable: {0}")]
    Unavailable(String),

    /// Write rejected because the backend is out of space
    #[error("Durable storage quota exceeded: {needed} bytes needed, {limit} bytes allowed")]
    QuotaExceeded { needed: usize, limit: usize },

    /// Filesystem failure in a file-backed store
    #[error("Durable storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload could not be encoded or decoded as JSON
    #[error("Durable payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for durable storage operations.
pub type Result<T> = std::result::Result<T, DurableError>;
