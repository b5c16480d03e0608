//! Package destinations.

use crate::error::TransportError;
use crate::package::Package;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Receives a validated package.
///
/// Implementations hand the package to whatever consumes it: another
/// application, a network service, a directory on disk. A failed submit is
/// reported once and not retried.
pub trait ExportTransport {
    /// Delivers `package`.
    fn submit(&mut self, package: &Package) -> Result<(), TransportError>;
}

/// Writes a package into a directory.
///
/// ```text
/// <root>/
/// ├─ manifest.json
/// ├─ 000.png
/// ├─ 001.webp
/// └─ ...
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryTransport {
    root: PathBuf,
}

#[derive(Serialize)]
struct Manifest<'a> {
    software: &'a str,
    is_animated: bool,
    stickers: Vec<ManifestEntry<'a>>,
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    file: String,
    emojis: &'a str,
}

impl DirectoryTransport {
    /// Name of the manifest file.
    pub const MANIFEST: &'static str = "manifest.json";

    /// Creates a transport writing into `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the target directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn prepare(&self) -> Result<(), TransportError> {
        if self.root.exists() {
            if fs::read_dir(&self.root)?.next().is_some() {
                return Err(TransportError::TargetNotEmpty {
                    path: self.root.clone(),
                });
            }
        } else {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }
}

impl ExportTransport for DirectoryTransport {
    fn submit(&mut self, package: &Package) -> Result<(), TransportError> {
        self.prepare()?;

        let mut stickers = Vec::with_capacity(package.len());
        for (index, entry) in package.entries.iter().enumerate() {
            let file = format!("{index:03}.{}", entry.extension());
            fs::write(self.root.join(&file), &entry.image)?;
            stickers.push(ManifestEntry {
                file,
                emojis: &entry.emojis,
            });
        }

        let manifest = Manifest {
            software: &package.software,
            is_animated: package.is_animated,
            stickers,
        };
        let json = serde_json::to_vec_pretty(&manifest)?;
        fs::write(self.root.join(Self::MANIFEST), json)?;

        debug!(root = %self.root.display(), stickers = package.len(), "package written");
        Ok(())
    }
}
