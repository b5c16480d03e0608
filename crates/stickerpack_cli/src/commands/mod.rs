//! CLI command implementations.

pub mod compact;
pub mod edit;
pub mod export;
pub mod list;
pub mod show;

use std::path::Path;
use stickerpack_core::{EntityId, EntityStore, StoreConfig};

/// Opens the store directory, creating it on first use.
pub fn open_store(path: &Path) -> Result<EntityStore, Box<dyn std::error::Error>> {
    Ok(EntityStore::open_dir(path, StoreConfig::default())?)
}

/// Parses a set id given on the command line.
///
/// Accepts a full id or an unambiguous prefix of one listed by `list`.
pub fn resolve_set(store: &EntityStore, text: &str) -> Result<EntityId, Box<dyn std::error::Error>> {
    if let Ok(id) = text.parse::<EntityId>() {
        return Ok(id);
    }

    let matches: Vec<EntityId> = store
        .query(Default::default())
        .iter()
        .map(|s| s.id())
        .filter(|id| id.to_string().starts_with(text))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(format!("No set matches '{text}'").into()),
        _ => Err(format!("'{text}' matches {} sets", matches.len()).into()),
    }
}
