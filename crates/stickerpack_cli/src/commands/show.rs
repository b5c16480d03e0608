//! Show command implementation.

use super::resolve_set;
use stickerpack_core::imaging;
use stickerpack_core::EntityStore;

/// Runs the show command.
pub fn run(store: &EntityStore, set: &str) -> Result<(), Box<dyn std::error::Error>> {
    let set = resolve_set(store, set)?;
    let record = store.set(set).ok_or("Set not found")?;

    println!("Set {set}");
    println!("  Created: {}", record.created());
    println!("  Edited:  {}", record.edit_date());
    println!("  Stickers: {}", record.len());
    println!();

    for (index, sticker) in store.members(set)?.into_iter().enumerate() {
        let image = match imaging::inspect(sticker.image_data()) {
            Ok(info) => format!("{:?} {}x{}", info.format, info.width, info.height),
            Err(_) => "undecodable".to_string(),
        };
        println!(
            "  {index:>3}  {}  {:<12} {} ({} bytes)",
            sticker.id().short(),
            sticker.emoji_tag(),
            image,
            sticker.image_data().len()
        );
    }
    Ok(())
}
