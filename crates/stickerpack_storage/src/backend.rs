//! Storage backend trait definition.

use crate::error::StorageResult;

/// A durable, append-only byte log.
///
/// The entity store writes one frame per commit with [`append`](Self::append)
/// and makes it durable with [`sync`](Self::sync). On open it reads the whole
/// log back with [`read_all`](Self::read_all) and replays it.
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - after `sync` returns, every appended byte survives process termination
/// - `replace` is atomic: a reader observes either the old or the new log
/// - backends must be `Send + Sync` so a store can move between threads
pub trait StorageBackend: Send + Sync {
    /// Returns every byte currently in the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read.
    fn read_all(&self) -> StorageResult<Vec<u8>>;

    /// Appends data to the end of the log and returns its offset.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Makes all appended data durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the current size of the log in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Drops everything after `new_size`.
    ///
    /// Used by recovery to cut off a torn trailing write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TruncatePastEnd`](crate::StorageError::TruncatePastEnd)
    /// if `new_size` exceeds the current size.
    fn truncate(&mut self, new_size: u64) -> StorageResult<()>;

    /// Atomically replaces the whole log with `data`.
    ///
    /// Used by compaction to swap the journal for a single snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the new log cannot be written; the old log is
    /// left intact in that case.
    fn replace(&mut self, data: &[u8]) -> StorageResult<()>;
}
