//! Error types for the sticker core.

use crate::entity::EntityId;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The journal could not be written or synced. Pending edits are kept.
    #[error("persistence error: {0}")]
    Persistence(#[from] stickerpack_storage::StorageError),

    /// I/O error outside the journal (store directory, lock file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A journal frame could not be encoded or decoded.
    #[error("codec error: {message}")]
    Codec {
        /// Description of the failure.
        message: String,
    },

    /// The journal holds a damaged frame that is not the final one.
    #[error("journal corrupted at offset {offset}: {message}")]
    Corrupted {
        /// Byte offset of the damaged frame.
        offset: u64,
        /// Description of the damage.
        message: String,
    },

    /// Another process holds the store directory.
    #[error("store locked: another process has exclusive access")]
    StoreLocked,

    /// Entity not found in the working view.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A position outside the set's member range.
    #[error("index {index} out of range for {len} members")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of members in the set.
        len: usize,
    },

    /// Display index 0 is the add slot and never holds a member.
    #[error("index 0 is the reserved add slot")]
    ReservedSlot,

    /// The sticker does not belong to the set.
    #[error("sticker {sticker} is not a member of set {set}")]
    NotAMember {
        /// The set that was searched.
        set: EntityId,
        /// The sticker that was not found.
        sticker: EntityId,
    },

    /// Image decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The draft cannot become a sticker yet.
    #[error("draft incomplete: missing {missing}")]
    DraftIncomplete {
        /// What the draft still lacks.
        missing: &'static str,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a codec error.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Creates a journal corruption error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::Corrupted {
            offset,
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true when repeating the failed call may succeed.
    ///
    /// Only journal write failures qualify; everything else needs the
    /// caller's input or the stored data to change first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
