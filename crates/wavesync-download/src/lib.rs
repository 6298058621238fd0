#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod engine;
pub mod installer;
pub mod progress;
pub mod reconcile;
pub mod transport;

pub use engine::{
    ChunkedDownloader, FetchError, FetchOutcome, TEMP_SUFFIX, fetch_with_fallback, temp_path,
};
pub use installer::{GameInstaller, InstallerConfig, InstallerDeps};
pub use progress::ProgressThrottle;
pub use reconcile::{DEFAULT_VALIDATION_THRESHOLD, EntryStatus, Reconciler, Reconciliation};
pub use transport::{ReqwestTransport, TransportConfig};
