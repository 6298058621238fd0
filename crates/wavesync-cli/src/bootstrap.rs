//! CLI bootstrap - the composition root.
//!
//! The only place where concrete implementations are wired together:
//! - game-config source (launcher document or a static index URL)
//! - resource index cache (via wavesync-index)
//! - asset transport and installer (via wavesync-download)

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use wavesync_core::{GameConfigSource, RemoteGameConfig, StaticGameConfig};
use wavesync_download::{
    GameInstaller, InstallerConfig, InstallerDeps, ReqwestTransport, TransportConfig,
};
use wavesync_index::{IndexClientConfig, LauncherConfigClient, ResourceIndexCache};

use crate::error::CliError;
use crate::parser::Cli;

/// Bootstrap configuration, resolved from flags and environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Install root.
    pub install_dir: Option<PathBuf>,
    /// Launcher document URL.
    pub launcher_url: Option<String>,
    /// Direct resource index URL.
    pub index_url: Option<String>,
    /// Version to record when `index_url` is used.
    pub game_version: Option<String>,
}

impl CliConfig {
    /// Take the relevant global flags.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            install_dir: cli.install_dir.clone(),
            launcher_url: non_empty(cli.launcher_url.as_deref()),
            index_url: non_empty(cli.index_url.as_deref()),
            game_version: non_empty(cli.game_version.as_deref()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Fully composed context for command handlers.
pub struct CliContext {
    /// The installer.
    pub installer: Arc<GameInstaller>,
    /// Cancelled on Ctrl-C.
    pub cancel: CancellationToken,
}

/// Wire the installer from `config`.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let mut index_config = IndexClientConfig::new();
    if let Some(url) = &config.launcher_url {
        index_config = index_config.with_launcher_url(url.clone());
    }

    let config_source = config_source(&config, &index_config)?;
    let index = Arc::new(ResourceIndexCache::from_config(&index_config)?);
    let transport = ReqwestTransport::new(&TransportConfig::default())
        .map_err(|e| CliError::Config(e.to_string()))?;

    let mut installer_config = InstallerConfig::new();
    if let Some(dir) = config.install_dir {
        installer_config = installer_config.with_install_dir(dir);
    }

    let installer = GameInstaller::new(
        installer_config,
        InstallerDeps {
            config_source,
            index,
            transport: Arc::new(transport),
        },
    );

    Ok(CliContext {
        installer: Arc::new(installer),
        cancel: CancellationToken::new(),
    })
}

fn config_source(
    config: &CliConfig,
    index_config: &IndexClientConfig,
) -> Result<Arc<dyn GameConfigSource>, CliError> {
    match (&config.index_url, &config.launcher_url) {
        (Some(index_url), _) => {
            let version = config.game_version.clone().ok_or_else(|| {
                CliError::Arguments("--game-version is required with --index-url".into())
            })?;
            debug!(%index_url, %version, "Using static game config");
            Ok(Arc::new(StaticGameConfig::new(RemoteGameConfig::new(
                index_url.clone(),
                version,
            ))))
        }
        (None, Some(launcher_url)) => {
            debug!(%launcher_url, "Using launcher game config");
            Ok(Arc::new(LauncherConfigClient::new(index_config)?))
        }
        (None, None) => Err(CliError::Config(
            "set --launcher-url or --index-url (or WAVESYNC_LAUNCHER_URL / WAVESYNC_INDEX_URL)"
                .into(),
        )),
    }
}
