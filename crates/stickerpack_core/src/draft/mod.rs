//! The sticker being composed before it is inserted into a set.
//!
//! An image and a few emojis are collected in a [`StickerDraft`]. Images
//! are decoded and resized by an [`ImageLoader`] on a worker thread; each
//! load carries a [`LoadTicket`] and only the newest ticket's result is
//! applied, so a slow decode of an earlier paste cannot overwrite a later
//! one.

mod loader;
mod sticker_draft;

pub use loader::{ImageLoader, LoadResult};
pub use sticker_draft::{LoadTicket, StickerDraft};
