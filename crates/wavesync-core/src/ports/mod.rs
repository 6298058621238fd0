//! Port definitions (trait abstractions) for external collaborators.
//!
//! The installer talks to the network, to the host UI and to the launcher
//! configuration only through these traits. Concrete adapters live in
//! `wavesync-download` (reqwest transport) and `wavesync-index` (launcher
//! client); fakes live in [`crate::testing`].

pub mod event_sink;
pub mod game_config;
pub mod transport;

pub use event_sink::{CallbackSink, ChannelSink, InstallEventSink, NoopSink, SinkError};
pub use game_config::{GameConfigSource, StaticGameConfig};
pub use transport::{ByteRange, HttpTransport, ResponseBody, TransportError, TransportRequest};
