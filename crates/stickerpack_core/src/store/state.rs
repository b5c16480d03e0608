//! Committed records.

use super::feed::{ChangeType, EntityChange, EntityKind};
use super::observer::ObserveTarget;
use crate::entity::{EntityId, Sticker, StickerSet};
use crate::journal::Edit;
use std::collections::HashMap;

/// Records as of the last successful commit.
#[derive(Debug, Default)]
pub(crate) struct CommittedState {
    sets: HashMap<EntityId, StickerSet>,
    stickers: HashMap<EntityId, Sticker>,
}

impl CommittedState {
    pub(crate) fn from_records(sets: Vec<StickerSet>, stickers: Vec<Sticker>) -> Self {
        Self {
            sets: sets.into_iter().map(|s| (s.id(), s)).collect(),
            stickers: stickers.into_iter().map(|s| (s.id(), s)).collect(),
        }
    }

    pub(crate) fn set(&self, id: EntityId) -> Option<&StickerSet> {
        self.sets.get(&id)
    }

    pub(crate) fn sticker(&self, id: EntityId) -> Option<&Sticker> {
        self.stickers.get(&id)
    }

    pub(crate) fn sets(&self) -> impl Iterator<Item = &StickerSet> {
        self.sets.values()
    }

    pub(crate) fn stickers(&self) -> impl Iterator<Item = &Sticker> {
        self.stickers.values()
    }

    /// Applies one journal edit and reports what it did. Deleting a record
    /// that is not there changes nothing and reports nothing.
    pub(crate) fn apply(&mut self, edit: &Edit) -> Option<EntityChange> {
        let change = match edit {
            Edit::PutSet(set) => {
                let existed = self.sets.insert(set.id(), set.clone()).is_some();
                EntityChange {
                    kind: EntityKind::Set,
                    id: set.id(),
                    change: if existed {
                        ChangeType::Update
                    } else {
                        ChangeType::Insert
                    },
                }
            }
            Edit::PutSticker(sticker) => {
                let existed = self.stickers.insert(sticker.id(), sticker.clone()).is_some();
                EntityChange {
                    kind: EntityKind::Sticker,
                    id: sticker.id(),
                    change: if existed {
                        ChangeType::Update
                    } else {
                        ChangeType::Insert
                    },
                }
            }
            Edit::DeleteSticker(id) => {
                self.stickers.remove(id)?;
                EntityChange {
                    kind: EntityKind::Sticker,
                    id: *id,
                    change: ChangeType::Delete,
                }
            }
            Edit::DeleteSet(id) => {
                self.sets.remove(id)?;
                EntityChange {
                    kind: EntityKind::Set,
                    id: *id,
                    change: ChangeType::Delete,
                }
            }
        };
        Some(change)
    }

    /// Returns the committed ordering an observer watches.
    ///
    /// A member list of a set that does not exist is empty.
    pub(crate) fn ordering(&self, target: &ObserveTarget) -> Vec<EntityId> {
        match target {
            ObserveTarget::Sets(query) => {
                let mut sets: Vec<&StickerSet> = self.sets.values().collect();
                query.sort(&mut sets);
                sets.into_iter().map(StickerSet::id).collect()
            }
            ObserveTarget::Members(set) => self
                .sets
                .get(set)
                .map(|s| s.stickers().to_vec())
                .unwrap_or_default(),
        }
    }

    /// Records in id order, for snapshot frames.
    pub(crate) fn sorted_records(&self) -> (Vec<StickerSet>, Vec<Sticker>) {
        let mut sets: Vec<StickerSet> = self.sets.values().cloned().collect();
        sets.sort_by_key(StickerSet::id);
        let mut stickers: Vec<Sticker> = self.stickers.values().cloned().collect();
        stickers.sort_by_key(Sticker::id);
        (sets, stickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NewSticker;
    use crate::store::SetQuery;
    use crate::types::Timestamp;

    #[test]
    fn put_reports_insert_then_update() {
        let mut state = CommittedState::default();
        let set = StickerSet::new(EntityId::new(), Timestamp::from_millis(1));

        let first = state.apply(&Edit::PutSet(set.clone())).unwrap();
        let second = state.apply(&Edit::PutSet(set.clone())).unwrap();
        assert_eq!(first.change, ChangeType::Insert);
        assert_eq!(second.change, ChangeType::Update);

        let gone = state.apply(&Edit::DeleteSet(set.id())).unwrap();
        assert_eq!(gone.change, ChangeType::Delete);
        assert!(state.set(set.id()).is_none());
        assert!(state.apply(&Edit::DeleteSet(set.id())).is_none());
    }

    #[test]
    fn ordering_of_missing_set_is_empty() {
        let state = CommittedState::default();
        assert!(state
            .ordering(&ObserveTarget::Members(EntityId::new()))
            .is_empty());
        assert!(state
            .ordering(&ObserveTarget::Sets(SetQuery::default()))
            .is_empty());
    }

    #[test]
    fn from_records_indexes_by_id() {
        let set = StickerSet::new(EntityId::new(), Timestamp::from_millis(1));
        let sticker = Sticker::new(EntityId::new(), set.id(), NewSticker::new(vec![1], vec![]));
        let state = CommittedState::from_records(vec![set.clone()], vec![sticker.clone()]);

        assert_eq!(state.set(set.id()), Some(&set));
        assert_eq!(state.sticker(sticker.id()), Some(&sticker));
        assert_eq!(state.sorted_records().1.len(), 1);
    }
}
