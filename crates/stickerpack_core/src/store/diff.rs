//! Ordering diffs delivered to observers.

use crate::entity::EntityId;
use crate::types::SequenceNumber;
use std::collections::{HashMap, HashSet};

/// One entry of a [`Diff`].
///
/// `old_index` refers to the ordering before the commit, `new_index` to the
/// ordering after it. Inserted entries have no old index, removed entries no
/// new index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    /// The affected entity.
    pub id: EntityId,
    /// Position before the commit.
    pub old_index: Option<usize>,
    /// Position after the commit.
    pub new_index: Option<usize>,
}

/// How one commit changed an observed ordering.
///
/// Applying a diff works like a batched list update: remove every `removed`
/// and `moved` entry at its old index (highest first), then insert every
/// `inserted` and `moved` entry at its new index (lowest first). `updated`
/// entries kept their relative position but their record changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    /// Commit that produced the diff.
    pub sequence: SequenceNumber,
    /// Entities that entered the ordering.
    pub inserted: Vec<Change>,
    /// Entities that left the ordering.
    pub removed: Vec<Change>,
    /// Entities whose relative position changed.
    pub moved: Vec<Change>,
    /// Entities that stayed in place but were modified.
    pub updated: Vec<Change>,
}

impl Diff {
    /// Computes the diff between two orderings, or `None` if nothing changed.
    ///
    /// `touched` names the entities written by the commit; those that did
    /// not move are reported as updated.
    pub(crate) fn compute(
        sequence: SequenceNumber,
        old: &[EntityId],
        new: &[EntityId],
        touched: &HashSet<EntityId>,
    ) -> Option<Self> {
        let old_pos: HashMap<EntityId, usize> =
            old.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let new_pos: HashMap<EntityId, usize> =
            new.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let removed: Vec<Change> = old
            .iter()
            .enumerate()
            .filter(|(_, id)| !new_pos.contains_key(id))
            .map(|(i, id)| Change {
                id: *id,
                old_index: Some(i),
                new_index: None,
            })
            .collect();

        let inserted: Vec<Change> = new
            .iter()
            .enumerate()
            .filter(|(_, id)| !old_pos.contains_key(id))
            .map(|(i, id)| Change {
                id: *id,
                old_index: None,
                new_index: Some(i),
            })
            .collect();

        // Survivors in old order; those outside the longest run that is
        // also increasing in new order are the ones that moved.
        let common: Vec<(EntityId, usize, usize)> = old
            .iter()
            .enumerate()
            .filter_map(|(i, id)| new_pos.get(id).map(|&n| (*id, i, n)))
            .collect();
        let new_indices: Vec<usize> = common.iter().map(|c| c.2).collect();
        let stable: HashSet<usize> = longest_increasing(&new_indices).into_iter().collect();

        let mut moved = Vec::new();
        let mut updated = Vec::new();
        for (k, &(id, old_index, new_index)) in common.iter().enumerate() {
            let change = Change {
                id,
                old_index: Some(old_index),
                new_index: Some(new_index),
            };
            if !stable.contains(&k) {
                moved.push(change);
            } else if touched.contains(&id) {
                updated.push(change);
            }
        }

        let diff = Self {
            sequence,
            inserted,
            removed,
            moved,
            updated,
        };
        (!diff.is_empty()).then_some(diff)
    }

    /// Returns true if the diff reports no change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.updated.is_empty()
    }

    /// Replays the diff on the pre-commit ordering.
    #[must_use]
    pub fn apply(&self, old: &[EntityId]) -> Vec<EntityId> {
        let mut items = old.to_vec();

        let mut drops: Vec<usize> = self
            .removed
            .iter()
            .chain(&self.moved)
            .filter_map(|c| c.old_index)
            .collect();
        drops.sort_unstable_by(|a, b| b.cmp(a));
        drops.dedup();
        for index in drops {
            if index < items.len() {
                items.remove(index);
            }
        }

        let mut adds: Vec<(usize, EntityId)> = self
            .inserted
            .iter()
            .chain(&self.moved)
            .filter_map(|c| c.new_index.map(|n| (n, c.id)))
            .collect();
        adds.sort_unstable_by_key(|(index, _)| *index);
        for (index, id) in adds {
            items.insert(index.min(items.len()), id);
        }

        items
    }
}

/// Positions in `seq` of one longest strictly increasing subsequence.
fn longest_increasing(seq: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (i, &value) in seq.iter().enumerate() {
        let slot = tails.partition_point(|&t| seq[t] < value);
        if slot > 0 {
            prev[i] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(i);
        } else {
            tails[slot] = i;
        }
    }

    let mut out = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        out.push(i);
        cursor = prev[i];
    }
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(n: u8) -> EntityId {
        EntityId::from_bytes([n; 16])
    }

    fn ids(ns: &[u8]) -> Vec<EntityId> {
        ns.iter().map(|n| id(*n)).collect()
    }

    fn diff(old: &[u8], new: &[u8]) -> Option<Diff> {
        Diff::compute(SequenceNumber::new(1), &ids(old), &ids(new), &HashSet::new())
    }

    #[test]
    fn identical_orderings_have_no_diff() {
        assert!(diff(&[1, 2, 3], &[1, 2, 3]).is_none());
        assert!(diff(&[], &[]).is_none());
    }

    #[test]
    fn insert_and_remove_indices() {
        let d = diff(&[1, 2, 3], &[1, 3, 4]).unwrap();
        assert_eq!(d.removed.len(), 1);
        assert_eq!(d.removed[0].id, id(2));
        assert_eq!(d.removed[0].old_index, Some(1));
        assert_eq!(d.inserted[0].id, id(4));
        assert_eq!(d.inserted[0].new_index, Some(2));
        assert!(d.moved.is_empty());
    }

    #[test]
    fn move_to_front_reports_single_move() {
        let d = diff(&[1, 2, 3], &[3, 1, 2]).unwrap();
        assert_eq!(d.moved.len(), 1);
        assert_eq!(d.moved[0].id, id(3));
        assert_eq!(d.moved[0].old_index, Some(2));
        assert_eq!(d.moved[0].new_index, Some(0));
        assert_eq!(d.apply(&ids(&[1, 2, 3])), ids(&[3, 1, 2]));
    }

    #[test]
    fn touched_entities_in_place_are_updated() {
        let touched: HashSet<EntityId> = [id(2)].into_iter().collect();
        let d = Diff::compute(
            SequenceNumber::new(4),
            &ids(&[1, 2]),
            &ids(&[1, 2]),
            &touched,
        )
        .unwrap();
        assert_eq!(d.updated.len(), 1);
        assert_eq!(d.updated[0].old_index, Some(1));
        assert_eq!(d.updated[0].new_index, Some(1));
        assert_eq!(d.sequence, SequenceNumber::new(4));
    }

    #[test]
    fn longest_increasing_picks_a_maximal_run() {
        let run = longest_increasing(&[2, 0, 1, 3]);
        assert_eq!(run, vec![1, 2, 3]);
        assert!(longest_increasing(&[]).is_empty());
    }

    fn unique(values: Vec<u8>) -> Vec<u8> {
        let mut seen = HashSet::new();
        values.into_iter().filter(|v| seen.insert(*v)).collect()
    }

    proptest! {
        #[test]
        fn applying_diff_reproduces_new_order(
            old in prop::collection::vec(0u8..24, 0..16),
            new in prop::collection::vec(0u8..24, 0..16),
        ) {
            let old = ids(&unique(old));
            let new = ids(&unique(new));
            match Diff::compute(SequenceNumber::new(1), &old, &new, &HashSet::new()) {
                Some(d) => prop_assert_eq!(d.apply(&old), new),
                None => prop_assert_eq!(old, new),
            }
        }
    }
}
