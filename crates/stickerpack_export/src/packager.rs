//! Validation and packaging.

use crate::error::{ExportError, ExportResult, SubmitError, Violation};
use crate::limits::ExportLimits;
use crate::package::{Package, PackageEntry};
use crate::transport::ExportTransport;
use stickerpack_core::imaging;
use stickerpack_core::{EntityId, EntityStore, Sticker, StickerSetSnapshot};
use tracing::{debug, info, warn};

/// Checks sticker sets against [`ExportLimits`] and builds packages.
#[derive(Debug, Clone)]
pub struct Packager {
    limits: ExportLimits,
    software: String,
}

impl Packager {
    /// Creates a packager with default limits. `software` identifies the
    /// exporting application in every package.
    pub fn new(software: impl Into<String>) -> Self {
        Self {
            limits: ExportLimits::default(),
            software: software.into(),
        }
    }

    /// Replaces the limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ExportLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the limits in use.
    #[must_use]
    pub fn limits(&self) -> &ExportLimits {
        &self.limits
    }

    /// Validates a set and packages it in member order.
    ///
    /// Stops at the first violation. Each sticker is checked in member order
    /// for an accepted format first, so data of the wrong type is a
    /// [`ExportError::DataTypeMismatch`] whatever its size or dimensions.
    /// Then come file size, the dimensions declared in the image header, and
    /// finally a full decode. The sticker count is checked last.
    pub fn package(&self, snapshot: &StickerSetSnapshot) -> ExportResult<Package> {
        if snapshot.stickers.is_empty() {
            return Err(ExportError::SetIsEmpty {
                set: snapshot.set.id(),
            });
        }

        let entries = snapshot
            .stickers
            .iter()
            .enumerate()
            .map(|(index, sticker)| self.check_sticker(index, sticker))
            .collect::<ExportResult<Vec<_>>>()?;

        self.check_count(entries.len())?;

        debug!(set = %snapshot.set.id().short(), stickers = entries.len(), "set packaged");
        Ok(Package {
            software: self.software.clone(),
            is_animated: false,
            entries,
        })
    }

    /// Packages a set from the store's working view.
    pub fn package_from_store(&self, store: &EntityStore, set: EntityId) -> ExportResult<Package> {
        let snapshot = store.snapshot(set)?;
        self.package(&snapshot)
    }

    /// Reports every violation instead of stopping at the first.
    #[must_use]
    pub fn audit(&self, snapshot: &StickerSetSnapshot) -> Vec<Violation> {
        if snapshot.stickers.is_empty() {
            return vec![ExportError::SetIsEmpty {
                set: snapshot.set.id(),
            }];
        }

        let mut violations: Vec<Violation> = snapshot
            .stickers
            .iter()
            .enumerate()
            .filter_map(|(index, sticker)| self.check_sticker(index, sticker).err())
            .collect();
        if let Err(err) = self.check_count(snapshot.stickers.len()) {
            violations.push(err);
        }
        violations
    }

    /// Packages `set` and hands it to `transport`.
    ///
    /// Nothing is submitted if validation fails. A transport failure is
    /// returned as is.
    pub fn export(
        &self,
        store: &EntityStore,
        set: EntityId,
        transport: &mut dyn ExportTransport,
    ) -> Result<Package, SubmitError> {
        let package = self.package_from_store(store, set)?;

        if let Err(err) = transport.submit(&package) {
            warn!(set = %set.short(), error = %err, "export transport failed");
            return Err(err.into());
        }

        info!(set = %set.short(), stickers = package.len(), "sticker set exported");
        Ok(package)
    }

    fn check_sticker(&self, index: usize, sticker: &Sticker) -> ExportResult<PackageEntry> {
        let data = sticker.image_data();
        let limits = &self.limits;
        let mismatch = |detected| ExportError::DataTypeMismatch {
            index,
            sticker: sticker.id(),
            detected,
        };

        let format = match imaging::detect_format(data) {
            Some(format) if limits.accepts(format) => format,
            detected => return Err(mismatch(detected)),
        };

        if data.len() > limits.max_file_size {
            return Err(ExportError::FileTooBig {
                index,
                sticker: sticker.id(),
                size: data.len(),
                max: limits.max_file_size,
            });
        }

        let info = imaging::inspect(data).map_err(|_| mismatch(Some(format)))?;
        if info.width == 0
            || info.height == 0
            || info.width > limits.max_dimension
            || info.height > limits.max_dimension
        {
            return Err(ExportError::InvalidDimensions {
                index,
                sticker: sticker.id(),
                width: info.width,
                height: info.height,
                max: limits.max_dimension,
            });
        }

        // Header checks out and the canvas is bounded; the pixels must decode.
        imaging::decode(data).map_err(|_| mismatch(Some(format)))?;

        Ok(PackageEntry {
            image: data.to_vec(),
            format,
            emojis: sticker.emoji_tag(),
        })
    }

    fn check_count(&self, count: usize) -> ExportResult<()> {
        if count > self.limits.max_sticker_count {
            return Err(ExportError::CountLimitExceeded {
                count,
                max: self.limits.max_sticker_count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use stickerpack_core::{CollectionEngine, EmptySetPolicy, InsertPosition, NewSticker};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 200, 10, 255]));
        let img = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
            _ => DynamicImage::ImageRgba8(img),
        };
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode(width, height, ImageFormat::Png)
    }

    fn store_with(images: Vec<Vec<u8>>) -> (EntityStore, EntityId) {
        let mut store = EntityStore::open_in_memory().unwrap();
        let engine = CollectionEngine::new();
        let mut set = None;
        for (i, image) in images.into_iter().enumerate() {
            let emoji = if i % 2 == 0 { "😀" } else { "🎉" };
            let placed = engine
                .insert(
                    &mut store,
                    NewSticker::new(image, vec![emoji.into(), "🐱".into()]),
                    set,
                    InsertPosition::End,
                )
                .unwrap();
            set = Some(placed.set);
        }
        store.commit().unwrap();
        (store, set.unwrap())
    }

    fn packager() -> Packager {
        Packager::new("org.example.stickers")
    }

    #[test]
    fn packages_in_member_order() {
        let (store, set) = store_with(vec![png(512, 512), png(100, 40)]);
        let package = packager().package_from_store(&store, set).unwrap();

        assert_eq!(package.software, "org.example.stickers");
        assert!(!package.is_animated);
        assert_eq!(package.len(), 2);
        assert_eq!(package.entries[0].emojis, "😀🐱");
        assert_eq!(package.entries[1].emojis, "🎉🐱");
        assert_eq!(package.entries[1].image, png(100, 40));
        assert_eq!(package.entries[0].format, ImageFormat::Png);
    }

    #[test]
    fn empty_set_is_rejected() {
        let mut store = EntityStore::open_in_memory().unwrap();
        let engine = CollectionEngine::new().with_policy(EmptySetPolicy::KeepEmpty);
        let placed = engine
            .insert(
                &mut store,
                NewSticker::new(png(8, 8), vec!["😀".into()]),
                None,
                InsertPosition::End,
            )
            .unwrap();
        engine.remove_at(&mut store, placed.set, 0).unwrap();

        let result = packager().package_from_store(&store, placed.set);
        assert!(matches!(result, Err(ExportError::SetIsEmpty { set }) if set == placed.set));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let (store, set) = store_with(vec![png(64, 64), png(64, 64)]);
        let small = packager().with_limits(ExportLimits::new().max_file_size(16));

        let result = small.package_from_store(&store, set);
        assert!(matches!(result, Err(ExportError::FileTooBig { index: 0, max: 16, .. })));
    }

    #[test]
    fn dimensions_over_limit_are_rejected() {
        let (store, set) = store_with(vec![png(64, 64), png(600, 10)]);
        let result = packager().package_from_store(&store, set);
        assert!(matches!(
            result,
            Err(ExportError::InvalidDimensions {
                index: 1,
                width: 600,
                height: 10,
                max: 512,
                ..
            })
        ));
    }

    #[test]
    fn wrong_format_is_a_type_mismatch() {
        let (store, set) = store_with(vec![encode(32, 32, ImageFormat::Jpeg)]);
        let result = packager().package_from_store(&store, set);
        assert!(matches!(
            result,
            Err(ExportError::DataTypeMismatch {
                index: 0,
                detected: Some(ImageFormat::Jpeg),
                ..
            })
        ));
    }

    #[test]
    fn wrong_format_wins_over_bad_dimensions() {
        let (store, set) = store_with(vec![encode(600, 600, ImageFormat::Jpeg)]);
        let result = packager().package_from_store(&store, set);
        assert!(matches!(
            result,
            Err(ExportError::DataTypeMismatch {
                index: 0,
                detected: Some(ImageFormat::Jpeg),
                ..
            })
        ));
    }

    #[test]
    fn wrong_format_wins_over_file_size() {
        let jpeg = encode(64, 64, ImageFormat::Jpeg);
        let limit = jpeg.len() - 1;
        let (store, set) = store_with(vec![jpeg]);
        let small = packager().with_limits(ExportLimits::new().max_file_size(limit));

        let result = small.package_from_store(&store, set);
        assert!(matches!(
            result,
            Err(ExportError::DataTypeMismatch {
                detected: Some(ImageFormat::Jpeg),
                ..
            })
        ));
    }

    #[test]
    fn png_with_damaged_pixels_is_a_type_mismatch() {
        let mut data = png(16, 16);
        data.truncate(41);
        let (store, set) = store_with(vec![data]);

        let result = packager().package_from_store(&store, set);
        assert!(matches!(
            result,
            Err(ExportError::DataTypeMismatch {
                detected: Some(ImageFormat::Png),
                ..
            })
        ));
    }

    #[test]
    fn undecodable_data_is_a_type_mismatch() {
        let (store, set) = store_with(vec![b"plain text, not pixels".to_vec()]);
        let result = packager().package_from_store(&store, set);
        assert!(matches!(
            result,
            Err(ExportError::DataTypeMismatch { detected: None, .. })
        ));
    }

    #[test]
    fn too_many_stickers_fail_after_sticker_checks() {
        let (store, set) = store_with(vec![png(4, 4), png(4, 4), png(4, 4)]);
        let limited = packager().with_limits(ExportLimits::new().max_sticker_count(2));
        let result = limited.package_from_store(&store, set);
        assert!(matches!(
            result,
            Err(ExportError::CountLimitExceeded { count: 3, max: 2 })
        ));

        let exact = packager().with_limits(ExportLimits::new().max_sticker_count(3));
        assert_eq!(exact.package_from_store(&store, set).unwrap().len(), 3);
    }

    #[test]
    fn audit_reports_every_violation() {
        let (store, set) = store_with(vec![
            png(600, 600),
            png(8, 8),
            encode(8, 8, ImageFormat::Jpeg),
        ]);
        let limited = packager().with_limits(ExportLimits::new().max_sticker_count(2));
        let violations = limited.audit(&store.snapshot(set).unwrap());

        assert_eq!(violations.len(), 3);
        assert!(matches!(violations[0], ExportError::InvalidDimensions { index: 0, .. }));
        assert!(matches!(violations[1], ExportError::DataTypeMismatch { index: 2, .. }));
        assert!(matches!(violations[2], ExportError::CountLimitExceeded { .. }));
    }

    #[test]
    fn unknown_set_is_a_store_error() {
        let store = EntityStore::open_in_memory().unwrap();
        let result = packager().package_from_store(&store, EntityId::new());
        assert!(matches!(result, Err(ExportError::Store(_))));
    }

    struct RecordingTransport {
        submitted: usize,
        fail: bool,
    }

    impl ExportTransport for RecordingTransport {
        fn submit(&mut self, _package: &Package) -> Result<(), TransportError> {
            self.submitted += 1;
            if self.fail {
                return Err(TransportError::Rejected("target unavailable".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn export_submits_once() {
        let (store, set) = store_with(vec![png(16, 16)]);
        let mut transport = RecordingTransport {
            submitted: 0,
            fail: false,
        };
        let package = packager().export(&store, set, &mut transport).unwrap();
        assert_eq!(package.len(), 1);
        assert_eq!(transport.submitted, 1);
    }

    #[test]
    fn transport_failure_is_surfaced_unchanged() {
        let (store, set) = store_with(vec![png(16, 16)]);
        let mut transport = RecordingTransport {
            submitted: 0,
            fail: true,
        };
        let result = packager().export(&store, set, &mut transport);
        assert!(matches!(
            result,
            Err(SubmitError::Transport(TransportError::Rejected(ref m))) if m == "target unavailable"
        ));
        assert_eq!(transport.submitted, 1);
    }

    #[test]
    fn invalid_set_is_not_submitted() {
        let (store, set) = store_with(vec![png(600, 600)]);
        let mut transport = RecordingTransport {
            submitted: 0,
            fail: false,
        };
        let result = packager().export(&store, set, &mut transport);
        assert!(matches!(result, Err(SubmitError::Export(_))));
        assert_eq!(transport.submitted, 0);
    }
}
