//! Install orchestrator.
//!
//! `GameInstaller` drives one forward pass over the manifest:
//!
//! 1. make sure the remote game config is known and obtain the manifest
//!    (forcing a refresh when the cached one is empty or missing)
//! 2. reconcile the install directory and emit `Preparing` plus the seed
//!    progress
//! 3. for each entry in manifest order, skip it if it is valid on disk,
//!    otherwise download it (primary URL, then fallbacks) and verify its
//!    checksum
//! 4. write the local state file, reload it, and emit `Completed`
//!
//! Any entry failure aborts the run. Files already published stay on disk
//! and are picked up by the next run's reconciliation.

mod config;
mod sink;

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;
use wavesync_core::{
    FallbackResolver, GameConfigSource, HttpTransport, InstallError, InstallEventSink, InstallKind,
    InstallProgress, InstallResult, InstallState, InstallStatus, LocalState, RemoteGameConfig,
    ResourceManifest, checksums_match, md5_file,
};
use wavesync_index::ResourceIndexCache;

use crate::engine::{ChunkedDownloader, fetch_with_fallback};
use crate::progress::ProgressThrottle;
use crate::reconcile::Reconciler;

pub use config::InstallerConfig;
use sink::SinkGuard;

/// Collaborators of a [`GameInstaller`].
#[derive(Clone)]
pub struct InstallerDeps {
    /// Where the remote game config comes from.
    pub config_source: Arc<dyn GameConfigSource>,
    /// Shared resource index cache.
    pub index: Arc<ResourceIndexCache>,
    /// Asset transport.
    pub transport: Arc<dyn HttpTransport>,
}

/// Resumable, verified installer for one game.
pub struct GameInstaller {
    config: InstallerConfig,
    config_source: Arc<dyn GameConfigSource>,
    index: Arc<ResourceIndexCache>,
    downloader: ChunkedDownloader,
    remote: RwLock<Option<RemoteGameConfig>>,
    local: RwLock<Option<LocalState>>,
}

impl GameInstaller {
    /// Create an installer. No I/O happens until a method is called.
    pub fn new(config: InstallerConfig, deps: InstallerDeps) -> Self {
        let downloader =
            ChunkedDownloader::new(deps.transport).with_buffer_size(config.read_buffer_size);
        Self {
            config,
            config_source: deps.config_source,
            index: deps.index,
            downloader,
            remote: RwLock::new(None),
            local: RwLock::new(None),
        }
    }

    /// The configuration this installer was built with.
    pub const fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Fetch the remote game config and warm the index cache.
    ///
    /// The config is fetched on every call. A failure to warm the cache is
    /// logged and ignored; the run will retry.
    pub async fn initialize(&self) -> InstallResult<RemoteGameConfig> {
        let remote = self.config_source.fetch().await?;
        if remote.index_url.trim().is_empty() {
            return Err(InstallError::not_initialized(
                "remote game config has no index URL",
            ));
        }
        *self.remote.write().await = Some(remote.clone());

        match parse_url(&remote.index_url) {
            Ok(url) => {
                if let Err(e) = self.index.get(&url, true).await {
                    warn!(error = %e, "Could not warm resource index cache");
                }
            }
            Err(e) => warn!(error = %e, "Index URL is not valid"),
        }

        info!(version = %remote.current_version, "Installer initialized");
        Ok(remote)
    }

    /// The remote config from the last successful `initialize`.
    pub async fn remote_config(&self) -> Option<RemoteGameConfig> {
        self.remote.read().await.clone()
    }

    /// The local state as last loaded.
    pub async fn local_state(&self) -> Option<LocalState> {
        self.local.read().await.clone()
    }

    /// Full install.
    pub async fn install(
        &self,
        sink: &dyn InstallEventSink,
        cancel: &CancellationToken,
    ) -> InstallResult<InstallProgress> {
        self.run(InstallKind::Install, sink, cancel).await
    }

    /// Update an existing install to the remote version.
    pub async fn update(
        &self,
        sink: &dyn InstallEventSink,
        cancel: &CancellationToken,
    ) -> InstallResult<InstallProgress> {
        self.run(InstallKind::Update, sink, cancel).await
    }

    /// Pre-download the advertised version.
    pub async fn preload(
        &self,
        sink: &dyn InstallEventSink,
        cancel: &CancellationToken,
    ) -> InstallResult<InstallProgress> {
        self.run(InstallKind::Preload, sink, cancel).await
    }

    /// Run one full pass. All kinds share the same algorithm.
    pub async fn run(
        &self,
        kind: InstallKind,
        sink: &dyn InstallEventSink,
        cancel: &CancellationToken,
    ) -> InstallResult<InstallProgress> {
        let result = self.run_inner(kind, sink, cancel).await;
        match &result {
            Ok(progress) => info!(
                %kind,
                entries = progress.downloaded_count,
                bytes = progress.downloaded_bytes,
                "Run completed"
            ),
            Err(e) if e.is_cancelled() => info!(%kind, "Run cancelled"),
            Err(e) => warn!(%kind, error = %e, "Run failed"),
        }
        result
    }

    async fn run_inner(
        &self,
        kind: InstallKind,
        sink: &dyn InstallEventSink,
        cancel: &CancellationToken,
    ) -> InstallResult<InstallProgress> {
        let root = self.config.install_root()?.to_path_buf();
        let remote = self.ensure_initialized().await?;
        let index_url = parse_url(&remote.index_url)?;
        let manifest = self.require_manifest(&index_url).await?;

        if cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }
        info!(
            %kind,
            version = %remote.current_version,
            entries = manifest.len(),
            "Starting run"
        );

        let reconciler = Reconciler::new(&root, self.config.validation_threshold);
        let seed = reconciler.reconcile(&manifest).await?;
        let mut progress = InstallProgress::seeded(
            seed.valid_count,
            seed.total_count,
            seed.downloaded_bytes,
            seed.total_bytes,
        );

        let mut events = SinkGuard::new(sink);
        events.state(InstallState::Preparing);
        events.progress(progress);

        let resolver_base = remote
            .resource_base_url
            .as_deref()
            .unwrap_or(&remote.index_url);
        let resolver = FallbackResolver::new(parse_url(resolver_base)?);
        let mut throttle = ProgressThrottle::new(self.config.progress_interval);
        let mut download_announced = false;

        for (position, entry) in manifest.entries.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(InstallError::Cancelled);
            }
            if !entry.has_destination() {
                continue;
            }

            let output = reconciler.destination_path(entry)?;
            if reconciler.classify(entry).await?.is_valid() {
                if seed.was_valid(position) {
                    debug!(destination = %entry.destination, "Already present");
                } else {
                    progress.complete_entry();
                    progress.add_bytes(entry.size);
                    events.progress(progress);
                }
                continue;
            }

            if !download_announced {
                events.state(InstallState::Download);
                download_announced = true;
            }

            let primary = FallbackResolver::primary_url(&index_url, &entry.destination)
                .map_err(|e| InstallError::config(format!("{}: {e}", entry.destination)))?;

            throttle.arm();
            {
                let progress = &mut progress;
                let events = &mut events;
                let throttle = &mut throttle;
                let mut on_bytes = |n: u64| {
                    progress.add_bytes(n);
                    if throttle.should_emit() {
                        events.progress(*progress);
                    }
                };
                let outcome = fetch_with_fallback(
                    &self.downloader,
                    &resolver,
                    &primary,
                    entry,
                    &output,
                    cancel,
                    &mut on_bytes,
                )
                .await?;
                debug!(
                    destination = %entry.destination,
                    url = %outcome.url,
                    attempts = outcome.attempts,
                    bytes = outcome.bytes_written,
                    "Downloaded"
                );
            }

            if let Some(expected) = entry.declared_checksum() {
                let actual = md5_file(&output)
                    .await
                    .map_err(|e| InstallError::from_io_error(&e))?;
                if !checksums_match(&actual, expected) {
                    return Err(InstallError::checksum_mismatch(
                        entry.destination.clone(),
                        expected,
                        actual,
                    ));
                }
            }

            progress.complete_entry();
            events.progress(progress);
        }

        self.finalize(&remote).await?;

        events.progress_if_changed(progress);
        events.state(InstallState::Completed);
        Ok(progress)
    }

    /// Saturating sum of declared entry sizes, 0 when unavailable.
    pub async fn game_size(&self, kind: InstallKind) -> u64 {
        match self.current_manifest().await {
            Ok(manifest) => manifest.total_size(),
            Err(e) => {
                debug!(%kind, error = %e, "Game size unavailable");
                0
            }
        }
    }

    /// Bytes already on disk for the current manifest, 0 when unavailable.
    pub async fn downloaded_size(&self, kind: InstallKind) -> u64 {
        let Ok(root) = self.config.install_root() else {
            return 0;
        };
        match self.current_manifest().await {
            Ok(manifest) => {
                Reconciler::new(root, self.config.validation_threshold)
                    .estimate_downloaded(&manifest)
                    .await
            }
            Err(e) => {
                debug!(%kind, error = %e, "Downloaded size unavailable");
                0
            }
        }
    }

    /// Installed and remote versions.
    ///
    /// A remote config that cannot be fetched leaves `remote_version` empty.
    /// A state file that does not parse counts as not installed.
    pub async fn status(&self) -> InstallResult<InstallStatus> {
        let path = self.config.state_path()?;
        let local = match LocalState::load(&path).await {
            Ok(local) => local,
            Err(e @ InstallError::Config { .. }) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable state file");
                None
            }
            Err(e) => return Err(e),
        };
        *self.local.write().await = local.clone();

        let remote = match self.ensure_initialized().await {
            Ok(remote) => Some(remote),
            Err(e) => {
                warn!(error = %e, "Remote config unavailable");
                None
            }
        };

        Ok(InstallStatus::evaluate(local.as_ref(), remote.as_ref()))
    }

    async fn ensure_initialized(&self) -> InstallResult<RemoteGameConfig> {
        if let Some(remote) = self.remote.read().await.clone() {
            return Ok(remote);
        }
        self.initialize().await
    }

    async fn current_manifest(&self) -> InstallResult<Arc<ResourceManifest>> {
        let remote = self.ensure_initialized().await?;
        let url = parse_url(&remote.index_url)?;
        Ok(self.index.get(&url, false).await?)
    }

    async fn require_manifest(&self, index_url: &Url) -> InstallResult<Arc<ResourceManifest>> {
        match self.index.get(index_url, false).await {
            Ok(manifest) if !manifest.is_empty() => return Ok(manifest),
            Ok(_) => debug!("Cached resource index is empty, forcing refresh"),
            Err(e) => debug!(error = %e, "Resource index unavailable, forcing refresh"),
        }

        match self.index.get(index_url, true).await {
            Ok(manifest) if !manifest.is_empty() => Ok(manifest),
            Ok(_) => Err(InstallError::index_unavailable("resource index is empty")),
            Err(e) => Err(InstallError::index_unavailable(e.to_string())),
        }
    }

    async fn finalize(&self, remote: &RemoteGameConfig) -> InstallResult<()> {
        let path = self.config.state_path()?;
        LocalState::new(remote.current_version.clone(), remote.index_file_name())
            .save(&path)
            .await?;

        let reloaded = LocalState::load(&path).await?;
        *self.local.write().await = reloaded;
        Ok(())
    }
}

fn parse_url(raw: &str) -> InstallResult<Url> {
    Url::parse(raw.trim()).map_err(|e| InstallError::config(format!("invalid URL {raw}: {e}")))
}
