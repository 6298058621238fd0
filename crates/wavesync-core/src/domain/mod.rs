//! Domain model: manifest, progress, and persisted state.
//!
//! Pure data types. The only I/O here is reading and writing the small
//! local state file.

pub mod manifest;
pub mod progress;
pub mod state;

pub use manifest::{ChunkRange, ResourceEntry, ResourceManifest};
pub use progress::{InstallKind, InstallProgress, InstallState};
pub use state::{
    CachedIndex, DEFAULT_STATE_FILE_NAME, InstallStatus, LocalState, RemoteGameConfig,
};
