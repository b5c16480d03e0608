//! Validated export packages.

use image::ImageFormat;

/// One sticker of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Encoded image, unchanged from the store.
    pub image: Vec<u8>,
    /// Detected image format.
    pub format: ImageFormat,
    /// The sticker's emojis joined into one string.
    pub emojis: String,
}

impl PackageEntry {
    /// Returns the file extension for the entry's format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("bin")
    }
}

/// A sticker set that passed every export check, in set order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Identifier of the exporting application.
    pub software: String,
    /// Always false: only static stickers are exported.
    pub is_animated: bool,
    /// Stickers in member order.
    pub entries: Vec<PackageEntry>,
}

impl Package {
    /// Returns the number of stickers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the package has no stickers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_follows_format() {
        let entry = PackageEntry {
            image: vec![],
            format: ImageFormat::WebP,
            emojis: "😀".into(),
        };
        assert_eq!(entry.extension(), "webp");

        let png = PackageEntry {
            format: ImageFormat::Png,
            ..entry
        };
        assert_eq!(png.extension(), "png");
    }
}
