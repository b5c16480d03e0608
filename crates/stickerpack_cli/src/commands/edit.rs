//! Set editing commands.
//!
//! Each command stages its edits and commits once.

use super::resolve_set;
use std::fs;
use std::path::Path;
use stickerpack_core::imaging;
use stickerpack_core::{CollectionEngine, EntityStore, InsertPosition, StickerDraft};
use tracing::info;

fn engine(store: &EntityStore) -> CollectionEngine {
    CollectionEngine::for_config(store.config())
}

/// Adds a sticker made from an image file.
pub fn add(
    store: &mut EntityStore,
    set: Option<&str>,
    image: &Path,
    emoji: &str,
    at: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let set = set.map(|s| resolve_set(store, s)).transpose()?;

    let mut draft = StickerDraft::new();
    let ticket = draft.begin_load();
    let bytes = fs::read(image)?;
    let canonical = imaging::resize_to_canonical(&bytes, store.config().canonical_size)?;
    draft.complete_load(ticket, canonical);
    if draft.push_emoji(emoji) == 0 {
        return Err("No emoji given".into());
    }
    let sticker = draft.finalize()?;

    let position = at.map_or(InsertPosition::End, InsertPosition::At);
    let placed = engine(store).insert(store, sticker, set, position)?;
    store.commit()?;

    info!(set = %placed.set.short(), index = placed.index, "sticker added");
    println!(
        "Added sticker {} to set {} at index {}",
        placed.sticker.short(),
        placed.set,
        placed.index
    );
    Ok(())
}

/// Removes the sticker at `index`.
pub fn remove(
    store: &mut EntityStore,
    set: &str,
    index: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let set = resolve_set(store, set)?;
    let removal = engine(store).remove_at(store, set, index)?;
    store.commit()?;

    println!("Removed sticker {}", removal.sticker.short());
    if removal.set_deleted {
        println!("Set {} was empty and has been deleted", set.short());
    }
    Ok(())
}

/// Moves the sticker at `from` to `to`.
pub fn move_member(
    store: &mut EntityStore,
    set: &str,
    from: usize,
    to: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let set = resolve_set(store, set)?;
    engine(store).move_member(store, set, from, to)?;
    if store.commit()?.is_none() {
        println!("Nothing to move");
    } else {
        println!("Moved sticker from {from} to {to}");
    }
    Ok(())
}

/// Deletes a set and its stickers.
pub fn discard(store: &mut EntityStore, set: &str) -> Result<(), Box<dyn std::error::Error>> {
    let set = resolve_set(store, set)?;
    engine(store).discard_set(store, set)?;
    store.commit()?;

    println!("Deleted set {set}");
    Ok(())
}
