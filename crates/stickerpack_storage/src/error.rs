//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to truncate beyond the end of storage.
    #[error("cannot truncate to {requested} bytes, storage holds {size}")]
    TruncatePastEnd {
        /// The requested new size.
        requested: u64,
        /// The current storage size.
        size: u64,
    },

    /// The backend refused the write.
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

impl StorageError {
    /// Creates a write rejected error.
    pub fn write_rejected(message: impl Into<String>) -> Self {
        Self::WriteRejected(message.into())
    }
}
