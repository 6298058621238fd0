//! Local state reconciliation.
//!
//! Compares each manifest entry with what is on disk:
//!
//! - valid: the file exists and its length equals the declared size, or the
//!   size is unknown, a checksum is declared, the file is no larger than the
//!   validation threshold and its digest matches
//! - invalid: the file exists but fails those checks
//! - missing: no file
//!
//! A known size is trusted on its own; the checksum is only computed when
//! the size is unknown.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use wavesync_core::{
    InstallError, InstallResult, ResourceEntry, ResourceManifest, checksums_match, md5_file,
};

use crate::engine::temp_path;

/// Default upper bound for checksum-only validation (50 MiB).
pub const DEFAULT_VALIDATION_THRESHOLD: u64 = 50 * 1024 * 1024;

/// On-disk classification of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Present and acceptable; no download needed.
    ValidPresent,
    /// Present but wrong; will be overwritten.
    InvalidPresent,
    /// Not on disk.
    Missing,
}

impl EntryStatus {
    /// Whether the entry can be skipped.
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::ValidPresent)
    }
}

/// Result of a full reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Status of every manifest entry, aligned with `manifest.entries`.
    /// Entries without a destination are `None`.
    pub statuses: Vec<Option<EntryStatus>>,
    /// Entries with a non-empty destination.
    pub total_count: u64,
    /// Entries classified valid.
    pub valid_count: u64,
    /// Bytes on disk, counting `.tmp` files where the final file is absent.
    pub downloaded_bytes: u64,
    /// Declared size of the whole manifest.
    pub total_bytes: u64,
}

impl Reconciliation {
    /// Whether entry `index` was valid during this pass.
    pub fn was_valid(&self, index: usize) -> bool {
        self.statuses
            .get(index)
            .copied()
            .flatten()
            .is_some_and(EntryStatus::is_valid)
    }
}

/// Classifies manifest entries against an install root.
#[derive(Debug, Clone)]
pub struct Reconciler {
    root: PathBuf,
    validation_threshold: u64,
}

impl Reconciler {
    /// Create a reconciler for `root`.
    pub fn new(root: impl Into<PathBuf>, validation_threshold: u64) -> Self {
        Self {
            root: root.into(),
            validation_threshold,
        }
    }

    /// The install root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path of an entry.
    ///
    /// Destinations are `/`-separated relative paths; `\` is accepted too.
    /// Absolute paths and `..` components are rejected.
    pub fn destination_path(&self, entry: &ResourceEntry) -> InstallResult<PathBuf> {
        let mut path = self.root.clone();
        for segment in entry.destination.split(['/', '\\']) {
            if segment.is_empty() || segment == "." {
                continue;
            }
            let part = Path::new(segment);
            if !matches!(part.components().next(), Some(Component::Normal(_)))
                || part.components().count() != 1
            {
                return Err(InstallError::config(format!(
                    "unsafe destination path: {}",
                    entry.destination
                )));
            }
            path.push(segment);
        }
        if path == self.root {
            return Err(InstallError::config(format!(
                "empty destination path: {:?}",
                entry.destination
            )));
        }
        Ok(path)
    }

    /// Classify one entry.
    pub async fn classify(&self, entry: &ResourceEntry) -> InstallResult<EntryStatus> {
        let path = self.destination_path(entry)?;
        Ok(self.classify_path(entry, &path).await)
    }

    async fn classify_path(&self, entry: &ResourceEntry, path: &Path) -> EntryStatus {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return EntryStatus::InvalidPresent,
            Err(_) => return EntryStatus::Missing,
        };
        let len = metadata.len();

        if let Some(size) = entry.known_size() {
            return if len == size {
                EntryStatus::ValidPresent
            } else {
                debug!(destination = %entry.destination, len, size, "Size mismatch");
                EntryStatus::InvalidPresent
            };
        }

        let Some(expected) = entry.declared_checksum() else {
            return EntryStatus::InvalidPresent;
        };
        if len > self.validation_threshold {
            debug!(
                destination = %entry.destination,
                len,
                threshold = self.validation_threshold,
                "Too large to validate by checksum"
            );
            return EntryStatus::InvalidPresent;
        }

        match md5_file(path).await {
            Ok(actual) if checksums_match(&actual, expected) => EntryStatus::ValidPresent,
            Ok(actual) => {
                debug!(destination = %entry.destination, %expected, %actual, "Checksum mismatch");
                EntryStatus::InvalidPresent
            }
            Err(e) => {
                warn!(destination = %entry.destination, error = %e, "Could not hash existing file");
                EntryStatus::InvalidPresent
            }
        }
    }

    /// Bytes on disk for an entry: the final file, else its `.tmp`, else 0.
    pub async fn on_disk_bytes(&self, entry: &ResourceEntry) -> u64 {
        let Ok(path) = self.destination_path(entry) else {
            return 0;
        };
        if let Some(len) = file_len(&path).await {
            return len;
        }
        file_len(&temp_path(&path)).await.unwrap_or(0)
    }

    /// Classify every entry and compute the progress seed.
    pub async fn reconcile(&self, manifest: &ResourceManifest) -> InstallResult<Reconciliation> {
        let mut report = Reconciliation {
            statuses: Vec::with_capacity(manifest.len()),
            total_bytes: manifest.total_size(),
            ..Reconciliation::default()
        };

        for entry in &manifest.entries {
            if !entry.has_destination() {
                report.statuses.push(None);
                continue;
            }

            let status = self.classify(entry).await?;
            report.total_count += 1;
            if status.is_valid() {
                report.valid_count += 1;
            }
            report.downloaded_bytes = report
                .downloaded_bytes
                .saturating_add(self.on_disk_bytes(entry).await);
            report.statuses.push(Some(status));
        }

        debug!(
            total = report.total_count,
            valid = report.valid_count,
            bytes = report.downloaded_bytes,
            "Reconciled install directory"
        );
        Ok(report)
    }

    /// Bytes already on disk for a manifest.
    pub async fn estimate_downloaded(&self, manifest: &ResourceManifest) -> u64 {
        let mut total = 0u64;
        for entry in manifest.installable() {
            total = total.saturating_add(self.on_disk_bytes(entry).await);
        }
        total
    }
}

async fn file_len(path: &Path) -> Option<u64> {
    tokio::fs::metadata(path)
        .await
        .ok()
        .filter(std::fs::Metadata::is_file)
        .map(|m| m.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HELLO_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

    fn reconciler(dir: &TempDir) -> Reconciler {
        Reconciler::new(dir.path(), DEFAULT_VALIDATION_THRESHOLD)
    }

    #[tokio::test]
    async fn size_match_skips_checksum() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.bin"), vec![0u8; 100]).unwrap();
        let entry = ResourceEntry::new("a.bin", 100).with_checksum("not-the-real-md5");

        assert_eq!(
            reconciler(&dir).classify(&entry).await.unwrap(),
            EntryStatus::ValidPresent
        );
    }

    #[tokio::test]
    async fn size_mismatch_is_invalid() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.bin"), vec![0u8; 99]).unwrap();
        let entry = ResourceEntry::new("a.bin", 100);

        assert_eq!(
            reconciler(&dir).classify(&entry).await.unwrap(),
            EntryStatus::InvalidPresent
        );
    }

    #[tokio::test]
    async fn unknown_size_uses_checksum_under_threshold() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.bin"), b"hello world").unwrap();

        let good = ResourceEntry::new("b.bin", 0).with_checksum(HELLO_MD5.to_uppercase());
        let bad = ResourceEntry::new("b.bin", 0).with_checksum("00000000000000000000000000000000");

        let r = reconciler(&dir);
        assert_eq!(r.classify(&good).await.unwrap(), EntryStatus::ValidPresent);
        assert_eq!(r.classify(&bad).await.unwrap(), EntryStatus::InvalidPresent);
    }

    #[tokio::test]
    async fn unknown_size_over_threshold_is_never_hashed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.bin"), b"hello world").unwrap();
        let entry = ResourceEntry::new("b.bin", 0).with_checksum(HELLO_MD5);

        let r = Reconciler::new(dir.path(), 4);
        assert_eq!(r.classify(&entry).await.unwrap(), EntryStatus::InvalidPresent);
    }

    #[tokio::test]
    async fn unknown_size_without_checksum_is_invalid() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.bin"), b"x").unwrap();
        let entry = ResourceEntry::new("b.bin", 0);
        assert_eq!(
            reconciler(&dir).classify(&entry).await.unwrap(),
            EntryStatus::InvalidPresent
        );
    }

    #[tokio::test]
    async fn temp_file_counts_toward_estimate() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.bin.tmp"), vec![0u8; 40]).unwrap();
        let entry = ResourceEntry::new("a.bin", 100);

        let r = reconciler(&dir);
        assert_eq!(r.classify(&entry).await.unwrap(), EntryStatus::Missing);
        assert_eq!(r.on_disk_bytes(&entry).await, 40);
    }

    #[tokio::test]
    async fn reconcile_seeds_counts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.bin"), vec![0u8; 100]).unwrap();
        let manifest = ResourceManifest::new(vec![
            ResourceEntry::new("a.bin", 100),
            ResourceEntry::new("", 5),
            ResourceEntry::new("b.bin", 200).with_checksum(HELLO_MD5),
        ]);

        let report = reconciler(&dir).reconcile(&manifest).await.unwrap();
        assert_eq!(report.total_count, 2);
        assert_eq!(report.valid_count, 1);
        assert_eq!(report.downloaded_bytes, 100);
        assert_eq!(report.total_bytes, 305);
        assert!(report.was_valid(0));
        assert!(!report.was_valid(1));
        assert_eq!(report.statuses[2], Some(EntryStatus::Missing));
    }

    #[test]
    fn destination_paths_are_confined_to_root() {
        let dir = TempDir::new().unwrap();
        let r = reconciler(&dir);

        let ok = r.destination_path(&ResourceEntry::new("Client\\Content/./a.pak", 1)).unwrap();
        assert_eq!(ok, dir.path().join("Client").join("Content").join("a.pak"));

        assert!(r.destination_path(&ResourceEntry::new("../escape.bin", 1)).is_err());
        assert!(r.destination_path(&ResourceEntry::new("a/../../b", 1)).is_err());
    }
}
