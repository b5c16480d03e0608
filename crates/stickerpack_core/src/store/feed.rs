//! Commit feed for subscribers that want every committed change.
//!
//! Observers registered with [`EntityStore::observe`](crate::EntityStore::observe)
//! get positional diffs of one ordering. The feed is coarser: it emits one
//! [`CommitEvent`] per commit listing every record touched, in commit
//! order, to any number of channel subscribers.

use crate::entity::EntityId;
use crate::types::SequenceNumber;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::collections::VecDeque;

/// Kind of record a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A sticker set.
    Set,
    /// A sticker.
    Sticker,
}

/// Type of change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// Record was inserted (no previous version existed).
    Insert,
    /// Record was updated (previous version existed).
    Update,
    /// Record was deleted.
    Delete,
}

/// A single record change within a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityChange {
    /// Kind of record.
    pub kind: EntityKind,
    /// Record id.
    pub id: EntityId,
    /// What happened to it.
    pub change: ChangeType,
}

/// Every record change of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    /// Sequence number of the commit.
    pub sequence: SequenceNumber,
    /// Changes in journal order.
    pub changes: Vec<EntityChange>,
}

impl CommitEvent {
    /// Returns the changes of one kind.
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &EntityChange> {
        self.changes.iter().filter(move |c| c.kind == kind)
    }
}

/// Distributes commit events to subscribers and keeps a bounded history.
pub(crate) struct CommitFeed {
    subscribers: RwLock<Vec<Sender<CommitEvent>>>,
    history: RwLock<VecDeque<CommitEvent>>,
    max_history: usize,
}

impl CommitFeed {
    pub(crate) fn new() -> Self {
        Self::with_max_history(1024)
    }

    pub(crate) fn with_max_history(max_history: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            history: RwLock::new(VecDeque::new()),
            max_history,
        }
    }

    /// Returns a receiver for all future events.
    pub(crate) fn subscribe(&self) -> Receiver<CommitEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.write().push(tx);
        rx
    }

    /// Records `event` and sends it to every live subscriber, dropping
    /// subscribers whose receiver is gone.
    pub(crate) fn emit(&self, event: CommitEvent) {
        {
            let mut history = self.history.write();
            history.push_back(event.clone());
            while history.len() > self.max_history {
                history.pop_front();
            }
        }

        self.subscribers
            .write()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Returns events after `cursor`, up to `limit`.
    pub(crate) fn poll(&self, cursor: SequenceNumber, limit: usize) -> Vec<CommitEvent> {
        self.history
            .read()
            .iter()
            .filter(|e| e.sequence > cursor)
            .take(limit)
            .cloned()
            .collect()
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for CommitFeed {
    fn default() -> Self {
        Self::new()
    }
}
