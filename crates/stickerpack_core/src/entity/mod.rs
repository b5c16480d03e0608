//! Entity types: sticker sets, stickers and their identifiers.

mod emoji;
mod id;
mod record;

pub use emoji::parse_emojis;
pub use id::EntityId;
pub use record::{NewSticker, Sticker, StickerSet, StickerSetSnapshot};
