//! List command implementation.

use stickerpack_core::{EntityStore, SetQuery};

/// Runs the list command.
pub fn run(store: &EntityStore) -> Result<(), Box<dyn std::error::Error>> {
    let sets = store.query(SetQuery::recent_first());
    if sets.is_empty() {
        println!("No sticker sets.");
        return Ok(());
    }

    println!("{:<10} {:>8}  {:>15}", "SET", "STICKERS", "EDITED");
    for set in sets {
        println!(
            "{:<10} {:>8}  {:>15}",
            set.id().short(),
            set.len(),
            set.edit_date().as_millis()
        );
    }
    Ok(())
}
