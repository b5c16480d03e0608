//! Image inspection and resizing.
//!
//! Stickers are stored as PNG fitted into a square of the configured
//! canonical size. Export validation inspects the stored bytes again, since
//! records written by other tools may hold anything.

use crate::error::{CoreError, CoreResult};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Format and pixel size of an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Container format detected from the leading bytes.
    pub format: ImageFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Guesses the container format from the leading bytes.
#[must_use]
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Detects the format and reads the pixel size from the image header.
///
/// No pixel data is decoded, so an image declaring huge dimensions is
/// reported cheaply. Use [`decode`] to confirm the data is usable.
///
/// # Errors
///
/// [`CoreError::Image`] if the format is unknown or the header is damaged.
pub fn inspect(bytes: &[u8]) -> CoreResult<ImageInfo> {
    let format = image::guess_format(bytes)?;
    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(format);
    let (width, height) = reader.into_dimensions()?;
    Ok(ImageInfo {
        format,
        width,
        height,
    })
}

/// Fully decodes an image.
///
/// # Errors
///
/// [`CoreError::Image`] if the format is unknown or the data does not
/// decode.
pub fn decode(bytes: &[u8]) -> CoreResult<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.decode()?)
}

/// Scales an image to fit inside `size` x `size`, keeping its aspect ratio,
/// and re-encodes it as PNG.
///
/// Small images are scaled up as well as large ones down, so every stored
/// sticker touches the square on at least one side.
pub fn resize_to_canonical(bytes: &[u8], size: u32) -> CoreResult<Vec<u8>> {
    if size == 0 {
        return Err(CoreError::invalid_operation("canonical size must be positive"));
    }

    let decoded = decode(bytes)?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(CoreError::invalid_operation("image has no pixels"));
    }

    let fitted = decoded.resize(size, size, FilterType::Lanczos3);
    let rgba = DynamicImage::ImageRgba8(fitted.to_rgba8());

    let mut out = Cursor::new(Vec::new());
    rgba.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
