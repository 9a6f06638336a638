//! Storage error types.

use std::path::PathBuf;

/// Errors raised by a storage area.
///
/// The facade never surfaces these to callers; it logs them and collapses
/// the outcome into a `false` result.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A storage operation failed.
    #[error("storage error: {0}")]
    Internal(String),

    /// The durable area could not be loaded from or written to disk.
    #[error("persistence error at {path}: {message}")]
    Persistence {
        /// Path of the backing file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A value could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The storage area is disabled or otherwise unreachable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The storage area refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
