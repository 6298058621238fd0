//! End-to-end install runs against fake index and asset servers.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wavesync_core::testing::{FakeRoute, FakeTransport, RecordingSink, SinkBehavior};
use wavesync_core::{
    InstallError, InstallEvent, InstallProgress, InstallState, LocalState, RemoteGameConfig,
    StaticGameConfig, md5_hex,
};
use wavesync_download::{GameInstaller, InstallerConfig, InstallerDeps};
use wavesync_index::ResourceIndexCache;
use wavesync_index::testing::FakeBackend;

const INDEX_URL: &str = "https://cdn.example.com/game/index.json";
const ASSET_BASE: &str = "https://cdn.example.com/game/";

fn md5_of(bytes: &[u8]) -> String {
    md5_hex(&mut Cursor::new(bytes)).unwrap()
}

struct Harness {
    dir: TempDir,
    transport: FakeTransport,
    backend: FakeBackend,
    installer: GameInstaller,
}

impl Harness {
    fn new(index_json: &str) -> Self {
        Self::with_remote(index_json, RemoteGameConfig::new(INDEX_URL, "2.1.0"))
    }

    fn with_remote(index_json: &str, remote: RemoteGameConfig) -> Self {
        // Keep byte-level progress out of the event log.
        Self::with_interval(index_json, remote, Duration::from_secs(3600))
    }

    fn with_interval(index_json: &str, remote: RemoteGameConfig, interval: Duration) -> Self {
        let dir = TempDir::new().unwrap();
        let transport = FakeTransport::new().with_chunk_size(16);
        let backend = FakeBackend::new().with_json(INDEX_URL, index_json);
        let deps = InstallerDeps {
            config_source: Arc::new(StaticGameConfig::new(remote)),
            index: Arc::new(ResourceIndexCache::new(
                Arc::new(backend.clone()),
                Duration::from_secs(600),
            )),
            transport: Arc::new(transport.clone()),
        };
        let config = InstallerConfig::new()
            .with_install_dir(dir.path())
            .with_progress_interval(interval);
        let installer = GameInstaller::new(config, deps);
        Self {
            dir,
            transport,
            backend,
            installer,
        }
    }

    fn serve(&self, dest: &str, body: &[u8]) {
        self.transport
            .set_route(&format!("{ASSET_BASE}{dest}"), FakeRoute::Body(body.to_vec()));
    }

    fn write(&self, dest: &str, body: &[u8]) {
        let path = self.dir.path().join(dest);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn read(&self, dest: &str) -> Vec<u8> {
        std::fs::read(self.dir.path().join(dest)).unwrap()
    }

    fn exists(&self, dest: &str) -> bool {
        self.dir.path().join(dest).exists()
    }

    async fn install(&self, sink: &RecordingSink) -> Result<InstallProgress, InstallError> {
        self.installer
            .install(sink, &CancellationToken::new())
            .await
    }
}

#[tokio::test]
async fn partial_install_emits_expected_sequence() {
    let b_body = vec![7u8; 200];
    let index = format!(
        r#"{{"resource":[
            {{"dest":"a.bin","size":100}},
            {{"dest":"b.bin","size":200,"md5":"{}"}}
        ]}}"#,
        md5_of(&b_body)
    );
    let h = Harness::new(&index);
    h.write("a.bin", &[1u8; 100]);
    h.serve("b.bin", &b_body);

    let sink = RecordingSink::new();
    let result = h.install(&sink).await.unwrap();

    assert_eq!(
        sink.events(),
        vec![
            InstallEvent::state(InstallState::Preparing),
            InstallEvent::progress(InstallProgress::seeded(1, 2, 100, 300)),
            InstallEvent::state(InstallState::Download),
            InstallEvent::progress(InstallProgress::seeded(2, 2, 300, 300)),
            InstallEvent::state(InstallState::Completed),
        ]
    );
    assert_eq!(result, InstallProgress::seeded(2, 2, 300, 300));
    assert_eq!(h.transport.requested_urls(), vec![format!("{ASSET_BASE}b.bin")]);
    assert_eq!(h.read("b.bin"), b_body);
}

#[tokio::test]
async fn second_run_downloads_nothing() {
    let h = Harness::new(r#"{"resource":[{"dest":"Client/a.pak","size":32}]}"#);
    h.serve("Client/a.pak", &[3u8; 32]);

    h.install(&RecordingSink::new()).await.unwrap();
    h.transport.clear_requests();

    let sink = RecordingSink::new();
    h.install(&sink).await.unwrap();

    assert!(h.transport.requested_urls().is_empty());
    assert_eq!(
        sink.states(),
        vec![InstallState::Preparing, InstallState::Completed]
    );
    assert_eq!(
        sink.progress(),
        vec![InstallProgress::seeded(1, 1, 32, 32)]
    );
}

#[tokio::test]
async fn stale_temp_file_counts_then_gets_replaced() {
    let h = Harness::new(r#"{"resource":[{"dest":"a.bin","size":100}]}"#);
    h.write("a.bin.tmp", &[0u8; 40]);
    h.serve("a.bin", &[9u8; 100]);

    let sink = RecordingSink::new();
    let result = h.install(&sink).await.unwrap();

    assert_eq!(sink.progress()[0], InstallProgress::seeded(0, 1, 40, 100));
    // Clamped: the stale 40 bytes plus the fresh 100 never exceed the total.
    assert_eq!(result, InstallProgress::seeded(1, 1, 100, 100));
    assert_eq!(h.read("a.bin"), vec![9u8; 100]);
    assert!(!h.exists("a.bin.tmp"));
}

#[tokio::test]
async fn byte_progress_stays_clamped_and_monotonic() {
    let h = Harness::with_interval(
        r#"{"resource":[{"dest":"a.bin","size":100}]}"#,
        RemoteGameConfig::new(INDEX_URL, "2.1.0"),
        Duration::ZERO,
    );
    h.write("a.bin.tmp", &[0u8; 40]);
    h.serve("a.bin", &[9u8; 100]);

    let sink = RecordingSink::new();
    h.install(&sink).await.unwrap();

    let snapshots = sink.progress();
    // Seed, at least one in-flight update, completion.
    assert!(snapshots.len() > 2, "got {snapshots:?}");
    for p in &snapshots {
        assert!(p.downloaded_bytes <= p.total_bytes_to_download, "{p:?}");
        assert!(p.downloaded_count <= p.total_count_to_download, "{p:?}");
    }
    for pair in snapshots.windows(2) {
        let (before, after) = (pair[0], pair[1]);
        assert!(after.downloaded_bytes >= before.downloaded_bytes, "{pair:?}");
        assert!(after.downloaded_count >= before.downloaded_count, "{pair:?}");
        assert_eq!(after.total_bytes_to_download, before.total_bytes_to_download);
        assert_eq!(after.total_count_to_download, before.total_count_to_download);
    }
    assert_eq!(snapshots[0], InstallProgress::seeded(0, 1, 40, 100));
    assert_eq!(snapshots.last(), Some(&InstallProgress::seeded(1, 1, 100, 100)));
}

#[tokio::test]
async fn wrong_size_file_is_redownloaded() {
    let h = Harness::new(r#"{"resource":[{"dest":"a.bin","size":10}]}"#);
    h.write("a.bin", b"short");
    h.serve("a.bin", b"0123456789");

    h.install(&RecordingSink::new()).await.unwrap();
    assert_eq!(h.read("a.bin"), b"0123456789");
}

#[tokio::test]
async fn primary_404_falls_back_to_resource_base() {
    let remote = RemoteGameConfig::new(INDEX_URL, "2.1.0")
        .with_resource_base_url("https://mirror.example.com/res/");
    let h = Harness::with_remote(r#"{"resource":[{"dest":"Client/a.bin","size":4}]}"#, remote);
    h.transport.set_route(
        "https://mirror.example.com/res/Client/a.bin",
        FakeRoute::Body(b"data".to_vec()),
    );

    h.install(&RecordingSink::new()).await.unwrap();

    assert_eq!(
        h.transport.requested_urls(),
        vec![
            format!("{ASSET_BASE}Client/a.bin"),
            "https://mirror.example.com/res/Client/a.bin".to_string(),
        ]
    );
    assert_eq!(h.read("Client/a.bin"), b"data");
}

#[tokio::test]
async fn every_url_failing_is_exhausted() {
    let h = Harness::new(r#"{"resource":[{"dest":"a.bin","size":4}]}"#);

    let sink = RecordingSink::new();
    let err = h.install(&sink).await.unwrap_err();

    match err {
        InstallError::DownloadExhausted {
            destination,
            status_code,
            ..
        } => {
            assert_eq!(destination, "a.bin");
            assert_eq!(status_code, Some(404));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!sink.states().contains(&InstallState::Completed));
    assert!(!h.exists("app-game-config.json"));
}

#[tokio::test]
async fn checksum_mismatch_keeps_file_and_aborts() {
    let h = Harness::new(
        r#"{"resource":[
            {"dest":"a.bin","size":4,"md5":"00000000000000000000000000000000"},
            {"dest":"b.bin","size":4}
        ]}"#,
    );
    h.serve("a.bin", b"data");
    h.serve("b.bin", b"more");

    let sink = RecordingSink::new();
    let err = h.install(&sink).await.unwrap_err();

    assert!(matches!(err, InstallError::ChecksumMismatch { .. }));
    assert_eq!(h.read("a.bin"), b"data");
    assert!(!h.exists("b.bin"));
    assert!(!sink.states().contains(&InstallState::Completed));
}

#[tokio::test]
async fn unknown_size_with_matching_checksum_is_skipped() {
    let body = b"hello world";
    let index = format!(
        r#"{{"resource":[{{"dest":"a.bin","size":0,"md5":"{}"}}]}}"#,
        md5_of(body).to_uppercase()
    );
    let h = Harness::new(&index);
    h.write("a.bin", body);

    h.install(&RecordingSink::new()).await.unwrap();
    assert!(h.transport.requested_urls().is_empty());
}

#[tokio::test]
async fn chunked_entry_uses_ordered_ranges() {
    let h = Harness::new(
        r#"{"resource":[{"dest":"a.bin","size":8,
            "chunkInfos":[{"start":0,"end":3},{"start":4,"end":7}]}]}"#,
    );
    h.serve("a.bin", b"abcdefgh");

    h.install(&RecordingSink::new()).await.unwrap();

    let ranges = h
        .transport
        .requests()
        .iter()
        .map(|r| r.range.map(|range| range.header_value()))
        .collect::<Vec<_>>();
    assert_eq!(
        ranges,
        vec![Some("bytes=0-3".to_string()), Some("bytes=4-7".to_string())]
    );
    assert_eq!(h.read("a.bin"), b"abcdefgh");
}

#[tokio::test]
async fn cancellation_stops_without_fallback_or_completion() {
    let remote = RemoteGameConfig::new(INDEX_URL, "2.1.0")
        .with_resource_base_url("https://mirror.example.com/res/");
    let h = Harness::with_remote(r#"{"resource":[{"dest":"a.bin","size":64}]}"#, remote);
    h.transport.set_route(
        &format!("{ASSET_BASE}a.bin"),
        FakeRoute::Stall(vec![1u8; 16]),
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let sink = RecordingSink::new();
    let err = h.installer.install(&sink, &cancel).await.unwrap_err();

    assert_eq!(err, InstallError::Cancelled);
    assert_eq!(h.transport.requested_urls(), vec![format!("{ASSET_BASE}a.bin")]);
    assert!(!sink.states().contains(&InstallState::Completed));
    assert!(!h.exists("a.bin"));
    assert!(!h.exists("app-game-config.json"));
}

#[tokio::test]
async fn broken_sink_does_not_abort_the_run() {
    let h = Harness::new(r#"{"resource":[{"dest":"a.bin","size":4}]}"#);
    h.serve("a.bin", b"data");

    let sink = RecordingSink::with_behavior(SinkBehavior::Panic);
    h.install(&sink).await.unwrap();

    assert_eq!(h.read("a.bin"), b"data");
    assert_eq!(sink.states().last(), Some(&InstallState::Completed));
}

#[tokio::test]
async fn successful_run_records_version() {
    let h = Harness::new(r#"{"resource":[{"dest":"a.bin","size":4}]}"#);
    h.serve("a.bin", b"data");

    h.install(&RecordingSink::new()).await.unwrap();

    let state = LocalState::load(&h.dir.path().join("app-game-config.json"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state, LocalState::new("2.1.0", "index.json"));

    let status = h.installer.status().await.unwrap();
    assert!(status.is_installed);
    assert!(!status.update_available);
}

#[tokio::test]
async fn empty_index_is_unavailable() {
    let h = Harness::new(r#"{"resource":[]}"#);

    let sink = RecordingSink::new();
    let err = h.install(&sink).await.unwrap_err();

    assert!(matches!(err, InstallError::IndexUnavailable { .. }));
    assert!(sink.events().is_empty());
    // Warm-up, the cached read and the forced refresh.
    assert!(h.backend.requests().len() >= 2);
}
