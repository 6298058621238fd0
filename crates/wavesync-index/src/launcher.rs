//! Launcher config client.
//!
//! Reads the launcher document and turns it into a [`RemoteGameConfig`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;
use wavesync_core::{GameConfigSource, InstallResult, RemoteGameConfig};

use crate::config::IndexClientConfig;
use crate::error::{IndexError, IndexResult};
use crate::http::{IndexBackend, ReqwestIndexBackend};
use crate::parsing::parse_launcher_document;
use crate::url::{build_index_url, parse_index_url};

/// Fetches the remote game config from the launcher document.
pub struct LauncherConfigClient {
    backend: Arc<dyn IndexBackend>,
    launcher_url: Url,
    asset_base: String,
}

impl LauncherConfigClient {
    /// Create a client with the production reqwest backend.
    pub fn new(config: &IndexClientConfig) -> IndexResult<Self> {
        let backend = ReqwestIndexBackend::new(config)?;
        Self::with_backend(Arc::new(backend), config)
    }

    /// Create a client over an explicit backend.
    pub fn with_backend(
        backend: Arc<dyn IndexBackend>,
        config: &IndexClientConfig,
    ) -> IndexResult<Self> {
        let raw = config
            .launcher_url
            .as_deref()
            .ok_or_else(|| IndexError::MissingField {
                field: "launcher_url".to_string(),
            })?;
        let launcher_url = parse_index_url(raw)?;

        let asset_base = match &config.asset_base_url {
            Some(base) => base.clone(),
            None => launcher_url.join("./")?.to_string(),
        };

        Ok(Self {
            backend,
            launcher_url,
            asset_base,
        })
    }

    /// Fetch and interpret the launcher document.
    pub async fn fetch_config(&self) -> IndexResult<RemoteGameConfig> {
        debug!(url = %self.launcher_url, "Fetching launcher config");
        let body = self.backend.get_bytes(&self.launcher_url).await?;
        let document = parse_launcher_document(&body)?;

        let index_url = build_index_url(&self.asset_base, &document.index_file)?;
        let mut config = RemoteGameConfig::new(index_url.as_str(), document.version);

        if let Some(base) = document.base_url {
            let mut resolved = build_index_url(&self.asset_base, &base)?.to_string();
            if !resolved.ends_with('/') {
                resolved.push('/');
            }
            config = config.with_resource_base_url(resolved);
        }

        info!(
            version = %config.current_version,
            index_url = %config.index_url,
            "Resolved remote game config"
        );
        Ok(config)
    }
}

#[async_trait]
impl GameConfigSource for LauncherConfigClient {
    async fn fetch(&self) -> InstallResult<RemoteGameConfig> {
        Ok(self.fetch_config().await?)
    }
}
