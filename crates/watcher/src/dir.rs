//! Debug directory lifecycle

use std::fs;
use std::path::Path;
use tracing::debug;

/// Create the debug directory if missing and delete any stale snapshots
///
/// Only regular files are removed; subdirectories are left alone.
pub fn prepare_debug_dir(path: &Path) -> std::io::Result<()> {
    if !path.is_dir() {
        create_dir(path)?;
        return Ok(());
    }

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            debug!("Removing stale debug snapshot {}", entry.path().display());
            fs::remove_file(entry.path())?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn create_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o755).create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}
