//! # Stickerpack Core
//!
//! Data model and editing engine for sticker sets.
//!
//! This crate provides:
//! - [`StickerSet`] and [`Sticker`] records with ownership and ordering invariants
//! - [`EntityStore`]: pending edits, journaled commits, queries and diff observers
//! - [`CollectionEngine`]: insert, remove and move members of a set
//! - [`StickerDraft`] and [`ImageLoader`]: the pending sticker being composed,
//!   with cancellable background image loading
//!
//! ## Example
//!
//! ```rust
//! use stickerpack_core::{CollectionEngine, EntityStore, InsertPosition, NewSticker};
//!
//! let mut store = EntityStore::open_in_memory().unwrap();
//! let engine = CollectionEngine::new();
//!
//! let sticker = NewSticker::new(vec![0x89, b'P', b'N', b'G'], vec!["😀".into()]);
//! let placed = engine.insert(&mut store, sticker, None, InsertPosition::End).unwrap();
//! store.commit().unwrap();
//!
//! assert_eq!(store.set(placed.set).unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod collection;
mod config;
mod dir;
mod draft;
mod entity;
mod error;
pub mod imaging;
mod journal;
mod store;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collection::{CollectionEngine, InsertPosition, Placement, Removal, SlotLayout};
pub use config::{EmptySetPolicy, StoreConfig};
pub use draft::{ImageLoader, LoadResult, LoadTicket, StickerDraft};
pub use entity::{parse_emojis, EntityId, NewSticker, Sticker, StickerSet, StickerSetSnapshot};
pub use error::{CoreError, CoreResult};
pub use store::{
    Change, ChangeType, CommitEvent, Diff, EntityChange, EntityKind, EntityStore, ObserveTarget,
    ObserverId, SetQuery, SortKey,
};
pub use types::{SequenceNumber, Timestamp};

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
