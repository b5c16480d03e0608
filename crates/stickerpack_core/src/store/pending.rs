//! Uncommitted edits.

use crate::entity::{EntityId, Sticker, StickerSet};
use crate::journal::Edit;
use std::collections::BTreeMap;

/// A staged change to one record.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingWrite<T> {
    /// Insert or replace the record.
    Put(T),
    /// Remove the record.
    Delete,
}

/// All edits staged since the last commit.
///
/// Keyed by id in a `BTreeMap` so the journal frame for a commit is
/// deterministic. A later write to the same id replaces the earlier one.
#[derive(Debug, Default)]
pub(crate) struct PendingEdits {
    sets: BTreeMap<EntityId, PendingWrite<StickerSet>>,
    stickers: BTreeMap<EntityId, PendingWrite<Sticker>>,
}

impl PendingEdits {
    pub(crate) fn is_empty(&self) -> bool {
        self.sets.is_empty() && self.stickers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.sets.len() + self.stickers.len()
    }

    pub(crate) fn put_set(&mut self, set: StickerSet) {
        self.sets.insert(set.id(), PendingWrite::Put(set));
    }

    pub(crate) fn delete_set(&mut self, id: EntityId) {
        self.sets.insert(id, PendingWrite::Delete);
    }

    pub(crate) fn put_sticker(&mut self, sticker: Sticker) {
        self.stickers.insert(sticker.id(), PendingWrite::Put(sticker));
    }

    pub(crate) fn delete_sticker(&mut self, id: EntityId) {
        self.stickers.insert(id, PendingWrite::Delete);
    }

    /// Drops whatever is staged for a set that was never committed.
    pub(crate) fn unstage_set(&mut self, id: EntityId) {
        self.sets.remove(&id);
    }

    /// Drops whatever is staged for a sticker that was never committed.
    pub(crate) fn unstage_sticker(&mut self, id: EntityId) {
        self.stickers.remove(&id);
    }

    pub(crate) fn set(&self, id: EntityId) -> Option<&PendingWrite<StickerSet>> {
        self.sets.get(&id)
    }

    pub(crate) fn sticker(&self, id: EntityId) -> Option<&PendingWrite<Sticker>> {
        self.stickers.get(&id)
    }

    pub(crate) fn sets(&self) -> impl Iterator<Item = (&EntityId, &PendingWrite<StickerSet>)> {
        self.sets.iter()
    }

    pub(crate) fn stickers(&self) -> impl Iterator<Item = (&EntityId, &PendingWrite<Sticker>)> {
        self.stickers.iter()
    }

    /// Flattens the staged writes into journal edits.
    ///
    /// Puts come before deletes so a replay never sees a set that names a
    /// sticker record it has not read yet.
    pub(crate) fn to_edits(&self) -> Vec<Edit> {
        let mut edits = Vec::with_capacity(self.len());
        for write in self.sets.values() {
            if let PendingWrite::Put(set) = write {
                edits.push(Edit::PutSet(set.clone()));
            }
        }
        for write in self.stickers.values() {
            if let PendingWrite::Put(sticker) = write {
                edits.push(Edit::PutSticker(sticker.clone()));
            }
        }
        for (id, write) in &self.stickers {
            if matches!(write, PendingWrite::Delete) {
                edits.push(Edit::DeleteSticker(*id));
            }
        }
        for (id, write) in &self.sets {
            if matches!(write, PendingWrite::Delete) {
                edits.push(Edit::DeleteSet(*id));
            }
        }
        edits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NewSticker;
    use crate::types::Timestamp;

    fn set() -> StickerSet {
        StickerSet::new(EntityId::new(), Timestamp::from_millis(1))
    }

    #[test]
    fn later_write_replaces_earlier() {
        let mut pending = PendingEdits::default();
        let s = set();
        pending.put_set(s.clone());
        pending.delete_set(s.id());

        assert_eq!(pending.len(), 1);
        assert_eq!(pending.set(s.id()), Some(&PendingWrite::Delete));
    }

    #[test]
    fn edits_put_before_delete() {
        let mut pending = PendingEdits::default();
        let s = set();
        let gone = EntityId::new();
        pending.delete_sticker(gone);
        pending.put_set(s.clone());
        pending.put_sticker(Sticker::new(
            EntityId::new(),
            s.id(),
            NewSticker::new(vec![1], vec![]),
        ));

        let edits = pending.to_edits();
        assert_eq!(edits.len(), 3);
        assert!(matches!(edits[0], Edit::PutSet(_)));
        assert!(matches!(edits[1], Edit::PutSticker(_)));
        assert_eq!(edits[2], Edit::DeleteSticker(gone));
    }

    #[test]
    fn unstaging_leaves_no_edit() {
        let mut pending = PendingEdits::default();
        let s = set();
        pending.put_set(s.clone());
        pending.unstage_set(s.id());

        assert!(pending.is_empty());
        assert!(pending.to_edits().is_empty());
    }

    #[test]
    fn new_pending_is_empty() {
        let pending = PendingEdits::default();
        assert!(pending.is_empty());
        assert!(pending.to_edits().is_empty());
    }
}
