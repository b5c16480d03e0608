//! # Stickerpack Testkit
//!
//! Test utilities for stickerpack.
//!
//! This crate provides:
//! - Test stores, encoded test images and a failure-injecting backend
//! - Property-based generators for member list edits
//!
//! Cross-crate integration tests live in this crate's `tests/` directory.
//!
//! ## Usage
//!
//! ```rust
//! use stickerpack_testkit::prelude::*;
//!
//! let mut store = TestStore::memory();
//! let set = set_with_stickers(&mut store, 3);
//! assert_eq!(store.set(set).unwrap().len(), 3);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
