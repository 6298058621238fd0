#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod checksum;
pub mod domain;
pub mod errors;
pub mod events;
pub mod fallback;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use checksum::{checksums_match, md5_file, md5_hex, DIGEST_BUFFER_SIZE};
pub use domain::{
    CachedIndex, ChunkRange, InstallKind, InstallProgress, InstallState, InstallStatus,
    LocalState, RemoteGameConfig, ResourceEntry, ResourceManifest, DEFAULT_STATE_FILE_NAME,
};
pub use errors::{InstallError, InstallResult};
pub use events::InstallEvent;
pub use fallback::FallbackResolver;
pub use ports::{
    ByteRange, CallbackSink, ChannelSink, GameConfigSource, HttpTransport, InstallEventSink,
    NoopSink, ResponseBody, SinkError, StaticGameConfig, TransportError, TransportRequest,
};
