//! Persisted local state, remote game config and install status.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use super::manifest::ResourceManifest;
use crate::errors::{InstallError, InstallResult};

/// File name of the local state file inside the install root.
pub const DEFAULT_STATE_FILE_NAME: &str = "app-game-config.json";

/// Small JSON document written after a successful run.
///
/// Read back on later runs to learn the installed version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalState {
    /// Installed version string.
    pub version: String,
    /// File name of the resource index the install was built from.
    pub index_file: String,
}

impl LocalState {
    /// Create a new state record.
    pub fn new(version: impl Into<String>, index_file: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            index_file: index_file.into(),
        }
    }

    /// Read the state file. A missing file is `Ok(None)`.
    pub async fn load(path: &Path) -> InstallResult<Option<Self>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(InstallError::from_io_error(&e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| InstallError::config(format!("{}: {e}", path.display())))
    }

    /// Write the state file, replacing any previous content.
    ///
    /// The document is written and synced to `<path>.tmp` first, then moved
    /// over `path`, so an interrupted save never leaves a truncated state
    /// file behind.
    pub async fn save(&self, path: &Path) -> InstallResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallError::from_io_error(&e))?;
        }
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| InstallError::config(e.to_string()))?;

        let temp = state_temp_path(path);
        write_synced(&temp, &json)
            .await
            .map_err(|e| InstallError::from_io_error(&e))?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(InstallError::from_io_error(&e)),
        }
        tokio::fs::rename(&temp, path)
            .await
            .map_err(|e| InstallError::from_io_error(&e))?;

        tracing::debug!(path = %path.display(), version = %self.version, "Saved local state");
        Ok(())
    }
}

fn state_temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// What the remote launcher config tells us about the current release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteGameConfig {
    /// Absolute URL of the resource index document.
    pub index_url: String,
    /// CDN base for resource files, used to derive fallback URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_base_url: Option<String>,
    /// Authoritative current version.
    pub current_version: String,
}

impl RemoteGameConfig {
    /// Create a config from an index URL and a version.
    pub fn new(index_url: impl Into<String>, current_version: impl Into<String>) -> Self {
        Self {
            index_url: index_url.into(),
            resource_base_url: None,
            current_version: current_version.into(),
        }
    }

    /// Attach a resource base URL.
    #[must_use]
    pub fn with_resource_base_url(mut self, url: impl Into<String>) -> Self {
        self.resource_base_url = Some(url.into());
        self
    }

    /// File name component of the index URL (query and fragment stripped).
    #[must_use]
    pub fn index_file_name(&self) -> String {
        let without_query = self
            .index_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        without_query
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// A fetched manifest with its freshness window.
///
/// Replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone)]
pub struct CachedIndex {
    /// URL the manifest was fetched from.
    pub source_url: String,
    /// Shared immutable manifest.
    pub manifest: Arc<ResourceManifest>,
    /// When the fetch completed.
    pub fetched_at: DateTime<Utc>,
    /// After this instant the copy is stale.
    pub expires_at: DateTime<Utc>,
}

impl CachedIndex {
    /// Wrap a freshly fetched manifest.
    pub fn new(source_url: impl Into<String>, manifest: ResourceManifest, ttl: Duration) -> Self {
        let fetched_at = Utc::now();
        Self {
            source_url: source_url.into(),
            manifest: Arc::new(manifest),
            fetched_at,
            expires_at: fetched_at + ttl,
        }
    }

    /// Whether the copy may still be served at `now`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// Installed vs. remote version summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStatus {
    /// Version recorded in the local state file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_version: Option<String>,
    /// Version advertised by the remote config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_version: Option<String>,
    /// A readable local state file exists.
    pub is_installed: bool,
    /// Installed and the versions differ.
    pub update_available: bool,
}

impl InstallStatus {
    /// Derive the status from the local and remote versions.
    #[must_use]
    pub fn evaluate(local: Option<&LocalState>, remote: Option<&RemoteGameConfig>) -> Self {
        let installed_version = local.map(|s| s.version.clone());
        let remote_version = remote.map(|c| c.current_version.clone());
        let is_installed = local.is_some();
        let update_available = match (&installed_version, &remote_version) {
            (Some(installed), Some(remote)) => installed != remote,
            _ => false,
        };

        Self {
            installed_version,
            remote_version,
            is_installed,
            update_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn local_state_roundtrips_with_camel_case_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_STATE_FILE_NAME);

        LocalState::new("2.4.0", "indexFile.json")
            .save(&path)
            .await
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"version\""));
        assert!(raw.contains("\"indexFile\""));

        let loaded = LocalState::load(&path).await.unwrap().unwrap();
        assert_eq!(loaded.version, "2.4.0");
        assert_eq!(loaded.index_file, "indexFile.json");
    }

    #[tokio::test]
    async fn save_replaces_through_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_STATE_FILE_NAME);
        std::fs::write(&path, b"{\"version\":\"1.0.0\",\"indexFile\":\"a.json\"}").unwrap();
        // Left behind by an interrupted save.
        std::fs::write(dir.path().join("app-game-config.json.tmp"), b"{trunc").unwrap();

        LocalState::new("2.0.0", "index.json").save(&path).await.unwrap();

        assert!(!dir.path().join("app-game-config.json.tmp").exists());
        let loaded = LocalState::load(&path).await.unwrap();
        assert_eq!(loaded, Some(LocalState::new("2.0.0", "index.json")));
    }

    #[tokio::test]
    async fn missing_state_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = LocalState::load(&dir.path().join("nope.json")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn garbage_state_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_STATE_FILE_NAME);
        std::fs::write(&path, b"{not json").unwrap();

        let err = LocalState::load(&path).await.unwrap_err();
        assert!(matches!(err, InstallError::Config { .. }));
    }

    #[test]
    fn index_file_name_strips_query() {
        let config = RemoteGameConfig::new(
            "https://cdn.example.com/launcher/game/G153/indexFile.json?x=1",
            "2.4.0",
        );
        assert_eq!(config.index_file_name(), "indexFile.json");
    }

    #[test]
    fn cached_index_freshness() {
        let cached = CachedIndex::new("u", ResourceManifest::default(), Duration::minutes(10));
        assert!(cached.is_fresh_at(cached.fetched_at));
        assert!(cached.is_fresh_at(cached.expires_at));
        assert!(!cached.is_fresh_at(cached.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn update_available_only_when_installed_and_different() {
        let local = LocalState::new("2.3.0", "indexFile.json");
        let remote = RemoteGameConfig::new("https://x/indexFile.json", "2.4.0");

        let status = InstallStatus::evaluate(Some(&local), Some(&remote));
        assert!(status.is_installed);
        assert!(status.update_available);

        let status = InstallStatus::evaluate(None, Some(&remote));
        assert!(!status.is_installed);
        assert!(!status.update_available);

        let same = LocalState::new("2.4.0", "indexFile.json");
        let status = InstallStatus::evaluate(Some(&same), Some(&remote));
        assert!(!status.update_available);
    }
}
