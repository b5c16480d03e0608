//! Set listing queries.

use crate::entity::StickerSet;
use std::cmp::Ordering;

/// Field that set listings are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Time of the last membership change.
    #[default]
    EditDate,
    /// Creation time.
    Created,
}

/// A listing of sticker sets.
///
/// The default lists the most recently edited set first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetQuery {
    /// Sort field.
    pub sort: SortKey,
    /// Oldest first when true.
    pub ascending: bool,
}

impl Default for SetQuery {
    fn default() -> Self {
        Self::recent_first()
    }
}

impl SetQuery {
    /// Most recently edited set first.
    #[must_use]
    pub const fn recent_first() -> Self {
        Self {
            sort: SortKey::EditDate,
            ascending: false,
        }
    }

    /// Creates a query on `sort` in the given direction.
    #[must_use]
    pub const fn new(sort: SortKey, ascending: bool) -> Self {
        Self { sort, ascending }
    }

    /// Compares two sets under this query. Ties fall back to the id so the
    /// order is total.
    pub(crate) fn compare(&self, a: &StickerSet, b: &StickerSet) -> Ordering {
        let by_key = match self.sort {
            SortKey::EditDate => a.edit_date().cmp(&b.edit_date()),
            SortKey::Created => a.created().cmp(&b.created()),
        };
        let by_key = if self.ascending {
            by_key
        } else {
            by_key.reverse()
        };
        by_key.then_with(|| a.id().cmp(&b.id()))
    }

    /// Sorts `sets` in place.
    pub(crate) fn sort(&self, sets: &mut [&StickerSet]) {
        sets.sort_by(|a, b| self.compare(a, b));
    }
}
