//! # Stickerpack Export
//!
//! Turns a sticker set into a package another application can import.
//!
//! A [`Packager`] checks every sticker against [`ExportLimits`] (file size,
//! decodability, dimensions, format) and the set against the sticker count
//! limit, then hands the resulting [`Package`] to an [`ExportTransport`].
//! Errors carry the offending member position and expose the message shown
//! to the user through [`ExportError::message`].
//!
//! ## Example
//!
//! ```rust
//! use stickerpack_core::{CollectionEngine, EntityStore, InsertPosition, NewSticker};
//! use stickerpack_export::{ExportError, Packager};
//!
//! let mut store = EntityStore::open_in_memory().unwrap();
//! let placed = CollectionEngine::new()
//!     .insert(
//!         &mut store,
//!         NewSticker::new(b"not an image".to_vec(), vec!["😀".into()]),
//!         None,
//!         InsertPosition::End,
//!     )
//!     .unwrap();
//!
//! let err = Packager::new("org.example.stickers")
//!     .package_from_store(&store, placed.set)
//!     .unwrap_err();
//! assert!(matches!(err, ExportError::DataTypeMismatch { index: 0, .. }));
//! assert_eq!(err.message(), "One or more stickers are of an invalid data type.");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod limits;
mod package;
mod packager;
mod transport;

pub use error::{ExportError, ExportResult, SubmitError, TransportError, Violation};
pub use limits::{
    ExportLimits, ACCEPTED_FORMATS, MAX_DIMENSION, MAX_FILE_SIZE, MAX_STICKER_COUNT,
};
pub use package::{Package, PackageEntry};
pub use packager::Packager;
pub use transport::{DirectoryTransport, ExportTransport};

/// Re-exported so callers can name formats without depending on `image`.
pub use image::ImageFormat;
