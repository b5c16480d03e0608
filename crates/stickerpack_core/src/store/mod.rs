//! Entity store: pending edits, journaled commits, queries and observers.
//!
//! Edits are staged in memory and become durable only through
//! [`EntityStore::commit`]. A commit writes one journal frame, applies the
//! edits to the committed state, then notifies observers with one [`Diff`]
//! each and publishes a [`CommitEvent`] to subscribers.

mod diff;
mod entity_store;
mod feed;
mod observer;
mod pending;
mod query;
mod state;

pub use diff::{Change, Diff};
pub use entity_store::EntityStore;
pub use feed::{ChangeType, CommitEvent, EntityChange, EntityKind};
pub use observer::{ObserveTarget, ObserverId};
pub use query::{SetQuery, SortKey};
