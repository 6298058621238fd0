//! Temporary file naming and publishing.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix of the in-progress file next to each destination.
pub const TEMP_SUFFIX: &str = ".tmp";

/// `<output>.tmp`, keeping the full original file name.
pub fn temp_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Create the parent directory of `path` if needed.
pub async fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

/// Remove a file, treating "already gone" as success.
pub async fn remove_if_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Replace `output` with `temp`.
///
/// Delete-then-rename: the old file is removed first so the rename also
/// succeeds on platforms that refuse to overwrite.
pub async fn publish(temp: &Path, output: &Path) -> io::Result<()> {
    remove_if_exists(output).await?;
    tokio::fs::rename(temp, output).await
}
