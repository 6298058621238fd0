//! Install event sink port.
//!
//! Sinks are best-effort: the installer logs and discards anything a sink
//! returns, so a broken UI can never abort a download.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{InstallProgress, InstallState};
use crate::events::InstallEvent;

/// Failure reported by a sink.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    /// The receiving side has gone away.
    #[error("event receiver closed")]
    Closed,

    /// The sink refused the event.
    #[error("event rejected: {0}")]
    Rejected(String),
}

/// Port for delivering install events to the host.
///
/// `emit` is called on the install task and should not block.
pub trait InstallEventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: InstallEvent) -> Result<(), SinkError>;
}

impl<T: InstallEventSink + ?Sized> InstallEventSink for Arc<T> {
    fn emit(&self, event: InstallEvent) -> Result<(), SinkError> {
        (**self).emit(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl InstallEventSink for NoopSink {
    fn emit(&self, _event: InstallEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

type StateFn = dyn Fn(InstallState) + Send + Sync;
type ProgressFn = dyn Fn(InstallProgress) + Send + Sync;

/// Forwards events to a pair of host callbacks.
///
/// Either callback may be absent.
#[derive(Default)]
pub struct CallbackSink {
    on_state: Option<Box<StateFn>>,
    on_progress: Option<Box<ProgressFn>>,
}

impl CallbackSink {
    /// Create a sink with no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state-change callback.
    #[must_use]
    pub fn on_state(mut self, f: impl Fn(InstallState) + Send + Sync + 'static) -> Self {
        self.on_state = Some(Box::new(f));
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn on_progress(mut self, f: impl Fn(InstallProgress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSink")
            .field("on_state", &self.on_state.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl InstallEventSink for CallbackSink {
    fn emit(&self, event: InstallEvent) -> Result<(), SinkError> {
        match event {
            InstallEvent::StateChanged { state } => {
                if let Some(f) = &self.on_state {
                    f(state);
                }
            }
            InstallEvent::Progress(progress) => {
                if let Some(f) = &self.on_progress {
                    f(progress);
                }
            }
        }
        Ok(())
    }
}

/// Pushes events into an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<InstallEvent>,
}

impl ChannelSink {
    /// Wrap an existing sender.
    #[must_use]
    pub const fn new(tx: mpsc::UnboundedSender<InstallEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink and its receiving end.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<InstallEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl InstallEventSink for ChannelSink {
    fn emit(&self, event: InstallEvent) -> Result<(), SinkError> {
        self.tx.send(event).map_err(|_| SinkError::Closed)
    }
}
