//! End-to-end: launcher document -> index URL -> cached manifest.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;
use wavesync_core::GameConfigSource;
use wavesync_index::{
    IndexBackend, IndexClientConfig, IndexError, IndexResult, LauncherConfigClient,
    ResourceIndexCache,
};

/// Minimal backend serving fixed documents.
#[derive(Default)]
struct Documents {
    bodies: HashMap<String, String>,
    hits: Mutex<Vec<String>>,
}

impl Documents {
    fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl IndexBackend for Documents {
    async fn get_bytes(&self, url: &Url) -> IndexResult<Vec<u8>> {
        self.hits.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url.as_str())
            .map(|b| b.clone().into_bytes())
            .ok_or_else(|| IndexError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

const LAUNCHER: &str = "https://launcher.example.com/G153/launcher.json";

#[tokio::test]
async fn launcher_config_feeds_the_index_cache() {
    let backend = Arc::new(
        Documents::default()
            .with(
                LAUNCHER,
                r#"{"default": {"config": {"indexFile": "G153/2.4.0/indexFile.json", "version": "2.4.0"}}}"#,
            )
            .with(
                "https://cdn.example.com/G153/2.4.0/indexFile.json",
                r#"{"resource": [
                    {"dest": "Client/a.pak", "size": "1048576", "md5": "0123"},
                    {"dest": "Client/b.pak", "size": 20,
                     "chunkInfos": [{"start": 0, "end": 9}, {"start": 10, "end": 19}]}
                ]}"#,
            ),
    );

    let config = IndexClientConfig::new()
        .with_launcher_url(LAUNCHER)
        .with_asset_base_url("https://cdn.example.com/");
    let launcher = LauncherConfigClient::with_backend(backend.clone(), &config).unwrap();
    let remote = launcher.fetch().await.unwrap();

    let cache = ResourceIndexCache::new(backend.clone(), Duration::from_secs(600));
    let index_url = Url::parse(&remote.index_url).unwrap();
    let manifest = cache.get(&index_url, false).await.unwrap();

    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.total_size(), 1_048_596);
    assert!(manifest.entries[1].is_chunked());

    // Second read is served from memory.
    cache.get(&index_url, false).await.unwrap();
    assert_eq!(backend.hits.lock().unwrap().len(), 2);
}
