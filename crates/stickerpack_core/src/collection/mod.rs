//! Ordered collection engine.
//!
//! Keeps each set's member list free of duplicates and gaps while stickers
//! are inserted, removed and moved. All edits go through the
//! [`EntityStore`](crate::EntityStore) as staged writes and become durable on
//! the next commit.

mod engine;
mod layout;

pub use engine::{CollectionEngine, InsertPosition, Placement, Removal};
pub use layout::SlotLayout;
