//! Time-bounded cache of the resource index.
//!
//! One [`CachedIndex`] lives behind a mutex and is replaced wholesale on
//! refresh. The mutex is held across the fetch so concurrent callers share
//! one request instead of racing.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;
use wavesync_core::{CachedIndex, ResourceManifest};

use crate::config::{DEFAULT_CACHE_DURATION, IndexClientConfig};
use crate::error::{IndexError, IndexResult};
use crate::http::{IndexBackend, ReqwestIndexBackend};
use crate::parsing::parse_resource_index;
use crate::url::build_index_candidates;

#[allow(clippy::cast_possible_wrap)]
const DEFAULT_CACHE_SECS: i64 = DEFAULT_CACHE_DURATION.as_secs() as i64;

/// Resource index cache with stale-on-failure semantics.
///
/// - A fresh copy for the same URL is returned without I/O unless `force`.
/// - A successful fetch replaces the copy and restarts the expiry window.
/// - A failed, unforced fetch returns the previous copy if there is one.
/// - A failed forced fetch, or a failure with nothing cached, is an error.
pub struct ResourceIndexCache {
    backend: Arc<dyn IndexBackend>,
    ttl: chrono::Duration,
    slot: Mutex<Option<CachedIndex>>,
}

impl ResourceIndexCache {
    /// Create a cache over a backend with the given freshness window.
    pub fn new(backend: Arc<dyn IndexBackend>, cache_duration: Duration) -> Self {
        let ttl = chrono::Duration::from_std(cache_duration)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_CACHE_SECS));
        Self {
            backend,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Create a cache with the production reqwest backend.
    pub fn from_config(config: &IndexClientConfig) -> IndexResult<Self> {
        let backend = ReqwestIndexBackend::new(config)?;
        Ok(Self::new(Arc::new(backend), config.cache_duration))
    }

    /// Return the manifest for `index_url`, fetching when needed.
    pub async fn get(&self, index_url: &Url, force: bool) -> IndexResult<Arc<ResourceManifest>> {
        let mut slot = self.slot.lock().await;

        let cached = slot
            .as_ref()
            .filter(|c| c.source_url == index_url.as_str());

        if !force {
            if let Some(cached) = cached.filter(|c| c.is_fresh_at(Utc::now())) {
                debug!(url = %index_url, "Serving cached resource index");
                return Ok(Arc::clone(&cached.manifest));
            }
        }

        match fetch_index(self.backend.as_ref(), index_url).await {
            Ok(manifest) => {
                info!(
                    url = %index_url,
                    entries = manifest.len(),
                    "Fetched resource index"
                );
                let fresh = CachedIndex::new(index_url.as_str(), manifest, self.ttl);
                let manifest = Arc::clone(&fresh.manifest);
                *slot = Some(fresh);
                Ok(manifest)
            }
            Err(e) => {
                if !force {
                    if let Some(stale) = cached {
                        warn!(
                            url = %index_url,
                            error = %e,
                            fetched_at = %stale.fetched_at,
                            "Index refresh failed, serving stale copy"
                        );
                        return Ok(Arc::clone(&stale.manifest));
                    }
                }
                warn!(url = %index_url, error = %e, force, "Index fetch failed");
                Err(e)
            }
        }
    }

    /// The cached entry, if any, regardless of freshness.
    pub async fn snapshot(&self) -> Option<CachedIndex> {
        self.slot.lock().await.clone()
    }
}

/// Fetch and parse the index, walking alternate URLs on 404.
///
/// Any other failure stops the walk immediately.
async fn fetch_index(backend: &dyn IndexBackend, index_url: &Url) -> IndexResult<ResourceManifest> {
    for candidate in build_index_candidates(index_url) {
        match backend.get_bytes(&candidate).await {
            Ok(body) => {
                if candidate != *index_url {
                    info!(url = %candidate, "Resource index found at alternate URL");
                }
                return parse_resource_index(&body);
            }
            Err(e) if e.is_not_found() => {
                debug!(url = %candidate, "Index candidate not found");
            }
            Err(e) => return Err(e),
        }
    }

    Err(IndexError::Exhausted {
        url: index_url.to_string(),
    })
}
