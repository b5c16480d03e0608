//! Error types for export.

use image::ImageFormat;
use std::io;
use std::path::PathBuf;
use stickerpack_core::{CoreError, EntityId};
use thiserror::Error;

/// Result type for packaging.
pub type ExportResult<T> = Result<T, ExportError>;

/// Why a set cannot be packaged.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The set has no stickers.
    #[error("sticker set {set} is empty")]
    SetIsEmpty {
        /// The empty set.
        set: EntityId,
    },

    /// A sticker's encoded image is larger than allowed.
    #[error("sticker {index} ({sticker}) is {size} bytes, limit is {max}")]
    FileTooBig {
        /// Member position.
        index: usize,
        /// Sticker id.
        sticker: EntityId,
        /// Encoded size in bytes.
        size: usize,
        /// Limit in bytes.
        max: usize,
    },

    /// A sticker has no pixels or a side longer than allowed.
    #[error("sticker {index} ({sticker}) is {width}x{height}, limit is {max}x{max}")]
    InvalidDimensions {
        /// Member position.
        index: usize,
        /// Sticker id.
        sticker: EntityId,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Longest allowed side.
        max: u32,
    },

    /// A sticker is not an image of an accepted format.
    #[error("sticker {index} ({sticker}) has unsupported data type {}", describe(.detected))]
    DataTypeMismatch {
        /// Member position.
        index: usize,
        /// Sticker id.
        sticker: EntityId,
        /// Format detected from the data, if any.
        detected: Option<ImageFormat>,
    },

    /// The set holds more stickers than allowed.
    #[error("sticker set has {count} stickers, limit is {max}")]
    CountLimitExceeded {
        /// Number of stickers.
        count: usize,
        /// Limit.
        max: usize,
    },

    /// The set could not be read from the store.
    #[error("store error: {0}")]
    Store(#[from] CoreError),
}

fn describe(detected: &Option<ImageFormat>) -> String {
    match detected {
        Some(format) => format!("{format:?}"),
        None => "unknown".to_string(),
    }
}

impl ExportError {
    /// Returns the message shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::FileTooBig { .. } => "One or more stickers exceed the maximum file size.".into(),
            Self::InvalidDimensions { .. } => {
                "One or more stickers have invalid dimensions.".into()
            }
            Self::CountLimitExceeded { max, .. } => {
                format!("The sticker set has reached the maximum number of items ({max}).")
            }
            Self::DataTypeMismatch { .. } => {
                "One or more stickers are of an invalid data type.".into()
            }
            Self::SetIsEmpty { .. } => "The sticker set is empty.".into(),
            Self::Store(_) => "The sticker set could not be read.".into(),
        }
    }

    /// Returns the member position the error refers to, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::FileTooBig { index, .. }
            | Self::InvalidDimensions { index, .. }
            | Self::DataTypeMismatch { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// A single failed export check, as reported by
/// [`Packager::audit`](crate::Packager::audit).
pub type Violation = ExportError;

/// Errors raised while handing a package to its destination.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error while writing the package.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The manifest could not be serialized.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// The destination directory already holds files.
    #[error("target directory is not empty: {}", .path.display())]
    TargetNotEmpty {
        /// The directory.
        path: PathBuf,
    },

    /// The destination refused the package.
    #[error("package rejected: {0}")]
    Rejected(String),
}

/// Errors from [`Packager::export`](crate::Packager::export).
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The set failed validation; nothing was submitted.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The transport failed. Not retried.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
