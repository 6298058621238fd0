//! Installer configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use wavesync_core::{DEFAULT_STATE_FILE_NAME, DIGEST_BUFFER_SIZE, InstallError, InstallResult};

use crate::reconcile::DEFAULT_VALIDATION_THRESHOLD;

/// Plain configuration record for a [`GameInstaller`](super::GameInstaller).
///
/// # Example
///
/// ```
/// use wavesync_download::InstallerConfig;
///
/// let config = InstallerConfig::new()
///     .with_install_dir("/games/wuthering")
///     .with_validation_threshold(16 * 1024 * 1024);
/// assert!(config.state_path().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Install root. Required for any run.
    pub install_dir: Option<PathBuf>,
    /// Name of the state file inside the install root.
    pub state_file_name: String,
    /// Largest file validated by checksum alone when the size is unknown.
    pub validation_threshold: u64,
    /// Minimum spacing of byte-level progress events inside one entry.
    pub progress_interval: Duration,
    /// Write buffer size for downloads.
    pub read_buffer_size: usize,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            install_dir: None,
            state_file_name: DEFAULT_STATE_FILE_NAME.to_string(),
            validation_threshold: DEFAULT_VALIDATION_THRESHOLD,
            progress_interval: Duration::from_millis(100),
            read_buffer_size: DIGEST_BUFFER_SIZE,
        }
    }
}

impl InstallerConfig {
    /// Create a configuration with default settings and no install root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the install root.
    #[must_use]
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    /// Set the state file name.
    #[must_use]
    pub fn with_state_file_name(mut self, name: impl Into<String>) -> Self {
        self.state_file_name = name.into();
        self
    }

    /// Set the checksum validation threshold in bytes.
    #[must_use]
    pub const fn with_validation_threshold(mut self, bytes: u64) -> Self {
        self.validation_threshold = bytes;
        self
    }

    /// Set the in-entry progress interval.
    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set the download write buffer size.
    #[must_use]
    pub const fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// The install root, or `InstallPathMissing`.
    pub fn install_root(&self) -> InstallResult<&Path> {
        self.install_dir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(InstallError::InstallPathMissing)
    }

    /// Full path of the state file.
    pub fn state_path(&self) -> InstallResult<PathBuf> {
        Ok(self.install_root()?.join(&self.state_file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = InstallerConfig::default();
        assert_eq!(config.state_file_name, "app-game-config.json");
        assert_eq!(config.validation_threshold, 50 * 1024 * 1024);
        assert_eq!(config.progress_interval, Duration::from_millis(100));
        assert_eq!(config.read_buffer_size, 64 * 1024);
    }

    #[test]
    fn missing_install_dir_is_reported() {
        let config = InstallerConfig::new();
        assert_eq!(config.state_path(), Err(InstallError::InstallPathMissing));

        let config = InstallerConfig::new().with_install_dir("");
        assert_eq!(config.install_root(), Err(InstallError::InstallPathMissing));
    }

    #[test]
    fn state_path_joins_root() {
        let config = InstallerConfig::new()
            .with_install_dir("/games/ww")
            .with_state_file_name("state.json");
        assert_eq!(config.state_path().unwrap(), PathBuf::from("/games/ww/state.json"));
    }
}
