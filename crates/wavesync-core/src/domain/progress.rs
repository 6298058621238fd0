//! Install progress accumulator and coarse install state.

use serde::{Deserialize, Serialize};

/// Coarse state of an install run.
///
/// A run moves strictly forward: `Preparing -> Download -> Completed`.
/// Failure is reported as an error, never as a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallState {
    /// Reconciling local files against the manifest.
    Preparing,
    /// At least one entry is being fetched.
    Download,
    /// Every entry is present and verified; local state persisted.
    Completed,
}

impl InstallState {
    /// String representation used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Download => "download",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for InstallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which host operation started a run.
///
/// All three run the same full-manifest pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallKind {
    /// Fresh install.
    Install,
    /// Update of an existing install.
    Update,
    /// Pre-download of an upcoming version.
    Preload,
}

impl InstallKind {
    /// String representation used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Update => "update",
            Self::Preload => "preload",
        }
    }
}

impl std::fmt::Display for InstallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress snapshot for one run.
///
/// Every field is monotonically non-decreasing within a run, and
/// `downloaded_bytes` never exceeds `total_bytes_to_download` once the
/// latter is positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallProgress {
    /// Entries that are present and valid.
    pub downloaded_count: u64,
    /// Entries with a non-empty destination.
    pub total_count_to_download: u64,
    /// Bytes on disk or written so far.
    pub downloaded_bytes: u64,
    /// Declared size of the whole manifest.
    pub total_bytes_to_download: u64,
}

impl InstallProgress {
    /// Seed a progress snapshot from a reconciliation pass.
    #[must_use]
    pub const fn seeded(
        downloaded_count: u64,
        total_count_to_download: u64,
        downloaded_bytes: u64,
        total_bytes_to_download: u64,
    ) -> Self {
        let mut progress = Self {
            downloaded_count,
            total_count_to_download,
            downloaded_bytes,
            total_bytes_to_download,
        };
        progress.clamp();
        progress
    }

    /// Account for bytes written to disk.
    pub const fn add_bytes(&mut self, bytes: u64) {
        self.downloaded_bytes = self.downloaded_bytes.saturating_add(bytes);
        self.clamp();
    }

    /// Mark one more entry as present and valid.
    pub const fn complete_entry(&mut self) {
        if self.downloaded_count < self.total_count_to_download {
            self.downloaded_count += 1;
        }
    }

    /// Whether every counted entry is done.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.downloaded_count >= self.total_count_to_download
    }

    /// Completion in percent, by bytes when known, otherwise by count.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total_bytes_to_download > 0 {
            self.downloaded_bytes as f64 / self.total_bytes_to_download as f64 * 100.0
        } else if self.total_count_to_download > 0 {
            self.downloaded_count as f64 / self.total_count_to_download as f64 * 100.0
        } else {
            100.0
        }
    }

    const fn clamp(&mut self) {
        if self.total_bytes_to_download > 0 && self.downloaded_bytes > self.total_bytes_to_download
        {
            self.downloaded_bytes = self.total_bytes_to_download;
        }
    }
}
