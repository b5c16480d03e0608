//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores, encoded test
//! images and a storage backend whose writes can be made to fail.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stickerpack_core::{
    CollectionEngine, EntityId, EntityStore, InsertPosition, NewSticker, StoreConfig,
};
use stickerpack_storage::{InMemoryBackend, StorageBackend, StorageError, StorageResult};
use tempfile::TempDir;

pub use stickerpack_core::ManualClock;

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: EntityStore,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a new in-memory test store.
    pub fn memory() -> Self {
        Self {
            store: EntityStore::open_in_memory().expect("Failed to open in-memory store"),
            temp_dir: None,
        }
    }

    /// Creates a new store in a temporary directory.
    pub fn dir() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = EntityStore::open_dir(temp_dir.path(), StoreConfig::default())
            .expect("Failed to open directory store");
        Self {
            store,
            temp_dir: Some(temp_dir),
        }
    }

    /// Closes and reopens a directory store, returning the recovered state.
    ///
    /// Panics for in-memory stores.
    pub fn reopen(self) -> Self {
        let temp_dir = self.temp_dir.expect("reopen needs a directory store");
        drop(self.store);
        let store = EntityStore::open_dir(temp_dir.path(), StoreConfig::default())
            .expect("Failed to reopen directory store");
        Self {
            store,
            temp_dir: Some(temp_dir),
        }
    }
}

impl std::ops::Deref for TestStore {
    type Target = EntityStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl std::ops::DerefMut for TestStore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

/// Encodes a solid-colour image of the given size and format.
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let rgba = RgbaImage::from_pixel(width, height, Rgba([255, 128, 0, 255]));
    let img = match format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
        _ => DynamicImage::ImageRgba8(rgba),
    };
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)
        .expect("Failed to encode test image");
    out.into_inner()
}

/// Encodes a PNG.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Png)
}

/// Encodes a JPEG.
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Jpeg)
}

/// A tiny PNG whose header declares `width` x `height`.
///
/// Only the header is consistent: the pixel data is that of a 1x1 grayscale
/// image, so the file stays a few dozen bytes however large the declared
/// canvas.
pub fn png_declaring(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image::GrayImage::new(1, 1))
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode test image");
    let mut data = out.into_inner();
    // IHDR data starts after the 8-byte signature and the chunk length/type.
    data[16..20].copy_from_slice(&width.to_be_bytes());
    data[20..24].copy_from_slice(&height.to_be_bytes());
    let crc = crc32(&data[12..29]);
    data[29..33].copy_from_slice(&crc.to_be_bytes());
    data
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

/// A small valid sticker tagged with `emoji`.
pub fn sticker(emoji: &str) -> NewSticker {
    NewSticker::new(png(16, 16), vec![emoji.to_string()])
}

/// Inserts `count` small stickers into a new set and commits.
pub fn set_with_stickers(store: &mut EntityStore, count: usize) -> EntityId {
    let engine = CollectionEngine::new();
    let image = png(8, 8);
    let set = store.create_set();
    for i in 0..count {
        let emoji = if i % 2 == 0 { "😀" } else { "🎉" };
        engine
            .insert(
                store,
                NewSticker::new(image.clone(), vec![emoji.to_string()]),
                Some(set),
                InsertPosition::End,
            )
            .expect("Failed to insert sticker");
    }
    store.commit().expect("Failed to commit");
    set
}

/// An in-memory backend whose `append` fails while the switch is on.
///
/// Clones share the data and the switch.
#[derive(Clone, Default)]
pub struct FailingBackend {
    inner: InMemoryBackend,
    failing: Arc<AtomicBool>,
}

impl FailingBackend {
    /// Creates a backend that accepts writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns write failures on or off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a copy of the stored bytes.
    pub fn data(&self) -> Vec<u8> {
        self.inner.data()
    }
}

impl StorageBackend for FailingBackend {
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        self.inner.read_all()
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::write_rejected("injected write failure"));
        }
        self.inner.append(data)
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.inner.sync()
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        self.inner.truncate(new_size)
    }

    fn replace(&mut self, data: &[u8]) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::write_rejected("injected write failure"));
        }
        self.inner.replace(data)
    }
}
