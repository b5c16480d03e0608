//! Property-based test generators using proptest.
//!
//! Edit operations carry raw seeds rather than indices; [`apply_op`] maps
//! them onto whatever the set holds when the operation runs, so every
//! generated sequence is valid.

use proptest::prelude::*;
use stickerpack_core::{
    CollectionEngine, CoreResult, EntityId, EntityStore, InsertPosition, NewSticker,
};

/// Emojis used by generated stickers.
pub const EMOJIS: [&str; 8] = [
    "😀",
    "🎉",
    "🐱",
    "\u{2764}\u{FE0F}",
    "👍\u{1F3FD}",
    "\u{1F1FA}\u{1F1E6}",
    "👨\u{200D}👩\u{200D}👧",
    "1\u{FE0F}\u{20E3}",
];

/// Strategy for generating entity IDs.
pub fn entity_id_strategy() -> impl Strategy<Value = EntityId> {
    prop::array::uniform16(any::<u8>()).prop_map(EntityId::from_bytes)
}

/// Strategy for generating emoji lists of one to three entries.
pub fn emojis_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::sample::select(EMOJIS.to_vec()), 1..=3)
        .prop_map(|list| list.into_iter().map(String::from).collect())
}

/// One generated edit of a set's member list.
#[derive(Debug, Clone)]
pub enum EditOp {
    /// Insert at `seed % (len + 1)`.
    Insert {
        /// Position seed.
        seed: usize,
        /// Emojis of the new sticker.
        emojis: Vec<String>,
    },
    /// Remove the member at `seed % len`.
    Remove {
        /// Position seed.
        seed: usize,
    },
    /// Move the member at `from % len` to `to % len`.
    Move {
        /// Source seed.
        from: usize,
        /// Target seed.
        to: usize,
    },
    /// Commit the staged edits.
    Commit,
}

/// Strategy for generating a single edit.
pub fn edit_op_strategy() -> impl Strategy<Value = EditOp> {
    prop_oneof![
        4 => (any::<usize>(), emojis_strategy())
            .prop_map(|(seed, emojis)| EditOp::Insert { seed, emojis }),
        2 => any::<usize>().prop_map(|seed| EditOp::Remove { seed }),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(from, to)| EditOp::Move { from, to }),
        1 => Just(EditOp::Commit),
    ]
}

/// Strategy for generating a sequence of edits.
pub fn edit_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<EditOp>> {
    prop::collection::vec(edit_op_strategy(), 1..=max_len)
}

/// Applies `op` to `set`, resolving seeds against its current length.
///
/// Removes and moves on an empty set do nothing. The engine must keep empty
/// sets around, otherwise the set disappears after the first removal
/// empties it.
pub fn apply_op(
    engine: &CollectionEngine,
    store: &mut EntityStore,
    set: EntityId,
    op: &EditOp,
    image: &[u8],
) -> CoreResult<()> {
    let len = store.set(set).map(|s| s.len()).unwrap_or(0);
    match op {
        EditOp::Insert { seed, emojis } => {
            let at = engine.layout().display_index(seed % (len + 1));
            engine.insert(
                store,
                NewSticker::new(image.to_vec(), emojis.clone()),
                Some(set),
                InsertPosition::At(at),
            )?;
        }
        EditOp::Remove { seed } if len > 0 => {
            let at = engine.layout().display_index(seed % len);
            engine.remove_at(store, set, at)?;
        }
        EditOp::Move { from, to } if len > 0 => {
            let layout = engine.layout();
            engine.move_member(
                store,
                set,
                layout.display_index(from % len),
                layout.display_index(to % len),
            )?;
        }
        EditOp::Commit => {
            store.commit()?;
        }
        EditOp::Remove { .. } | EditOp::Move { .. } => {}
    }
    Ok(())
}

/// Mirrors `op` on a plain list of emoji tags, for comparing against the
/// store.
pub fn apply_op_to_model(model: &mut Vec<String>, op: &EditOp) {
    let len = model.len();
    match op {
        EditOp::Insert { seed, emojis } => model.insert(seed % (len + 1), emojis.concat()),
        EditOp::Remove { seed } if len > 0 => {
            model.remove(seed % len);
        }
        EditOp::Move { from, to } if len > 0 => {
            let item = model.remove(from % len);
            model.insert(to % len, item);
        }
        _ => {}
    }
}
