//! Compact command implementation.

use stickerpack_core::EntityStore;

/// Runs the compact command.
pub fn run(store: &mut EntityStore) -> Result<(), Box<dyn std::error::Error>> {
    let before = store.journal_size()?;
    store.compact()?;
    let after = store.journal_size()?;

    println!("Journal compacted at {}", store.sequence());
    println!("  Size before: {before} bytes");
    println!("  Size after:  {after} bytes");
    Ok(())
}
