//! Export command implementation.

use super::resolve_set;
use std::path::Path;
use stickerpack_core::EntityStore;
use stickerpack_export::{DirectoryTransport, Packager, SubmitError};

/// Application identifier used when none is given.
pub const DEFAULT_SOFTWARE: &str = "org.stickerpack.cli";

/// Runs the export command.
pub fn run(
    store: &EntityStore,
    set: &str,
    out: &Path,
    software: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let set = resolve_set(store, set)?;
    let packager = Packager::new(software);
    let mut transport = DirectoryTransport::new(out);

    match packager.export(store, set, &mut transport) {
        Ok(package) => {
            println!("Exported {} stickers to {}", package.len(), out.display());
            Ok(())
        }
        Err(SubmitError::Export(err)) => {
            println!("{}", err.message());
            if let Ok(snapshot) = store.snapshot(set) {
                for violation in packager.audit(&snapshot) {
                    println!("  - {violation}");
                }
            }
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}
