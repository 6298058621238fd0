//! Remote game configuration port.

use async_trait::async_trait;

use crate::domain::RemoteGameConfig;
use crate::errors::InstallResult;

/// Source of the remote game config (index URL and current version).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameConfigSource: Send + Sync {
    /// Fetch the current remote config.
    async fn fetch(&self) -> InstallResult<RemoteGameConfig>;
}

/// A fixed config supplied by the host, e.g. from command-line flags.
#[derive(Debug, Clone)]
pub struct StaticGameConfig {
    config: RemoteGameConfig,
}

impl StaticGameConfig {
    /// Serve `config` on every fetch.
    #[must_use]
    pub const fn new(config: RemoteGameConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl GameConfigSource for StaticGameConfig {
    async fn fetch(&self) -> InstallResult<RemoteGameConfig> {
        Ok(self.config.clone())
    }
}
