//! # Stickerpack Storage
//!
//! Durable byte stores for the sticker entity store.
//!
//! The entity store keeps its commit journal in a [`StorageBackend`]. A
//! backend knows nothing about stickers, frames or checksums: it appends
//! bytes, hands the whole log back on recovery, and can atomically swap the
//! log for a compacted one.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - shared in-memory buffer, for tests and ephemeral stores
//! - [`FileBackend`] - single journal file using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use stickerpack_storage::{InMemoryBackend, StorageBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.append(b"frame-1").unwrap();
//! backend.replace(b"snapshot").unwrap();
//! assert_eq!(backend.read_all().unwrap(), b"snapshot");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
