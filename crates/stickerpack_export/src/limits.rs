//! Export limits.

use image::ImageFormat;

/// Most stickers one set may hold.
pub const MAX_STICKER_COUNT: usize = 120;

/// Largest encoded sticker in bytes.
pub const MAX_FILE_SIZE: usize = 512 * 1024;

/// Longest allowed side in pixels.
pub const MAX_DIMENSION: u32 = 512;

/// Image formats the target accepts for static stickers.
pub const ACCEPTED_FORMATS: [ImageFormat; 2] = [ImageFormat::Png, ImageFormat::WebP];

/// Constraints a set must meet to be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLimits {
    /// Most stickers per set.
    pub max_sticker_count: usize,
    /// Largest encoded sticker in bytes.
    pub max_file_size: usize,
    /// Longest allowed side in pixels.
    pub max_dimension: u32,
    /// Accepted image formats.
    pub accepted_formats: Vec<ImageFormat>,
}

impl Default for ExportLimits {
    fn default() -> Self {
        Self {
            max_sticker_count: MAX_STICKER_COUNT,
            max_file_size: MAX_FILE_SIZE,
            max_dimension: MAX_DIMENSION,
            accepted_formats: ACCEPTED_FORMATS.to_vec(),
        }
    }
}

impl ExportLimits {
    /// Creates the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sticker count limit.
    #[must_use]
    pub fn max_sticker_count(mut self, count: usize) -> Self {
        self.max_sticker_count = count;
        self
    }

    /// Sets the file size limit.
    #[must_use]
    pub fn max_file_size(mut self, bytes: usize) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Sets the dimension limit.
    #[must_use]
    pub fn max_dimension(mut self, pixels: u32) -> Self {
        self.max_dimension = pixels;
        self
    }

    /// Replaces the accepted formats.
    #[must_use]
    pub fn accepted_formats(mut self, formats: impl IntoIterator<Item = ImageFormat>) -> Self {
        self.accepted_formats = formats.into_iter().collect();
        self
    }

    /// Returns true if `format` may be exported.
    #[must_use]
    pub fn accepts(&self, format: ImageFormat) -> bool {
        self.accepted_formats.contains(&format)
    }
}
