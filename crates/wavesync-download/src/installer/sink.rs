//! Best-effort event delivery.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::warn;
use wavesync_core::{InstallEvent, InstallEventSink, InstallProgress, InstallState};

/// Wraps a host sink so that its errors and panics never reach the
/// install loop.
pub(crate) struct SinkGuard<'a> {
    sink: &'a dyn InstallEventSink,
    last_progress: Option<InstallProgress>,
}

impl<'a> SinkGuard<'a> {
    pub(crate) fn new(sink: &'a dyn InstallEventSink) -> Self {
        Self {
            sink,
            last_progress: None,
        }
    }

    pub(crate) fn state(&self, state: InstallState) {
        self.deliver(InstallEvent::state(state));
    }

    pub(crate) fn progress(&mut self, progress: InstallProgress) {
        self.last_progress = Some(progress);
        self.deliver(InstallEvent::progress(progress));
    }

    /// Emit `progress` unless it equals the last snapshot sent.
    pub(crate) fn progress_if_changed(&mut self, progress: InstallProgress) {
        if self.last_progress != Some(progress) {
            self.progress(progress);
        }
    }

    fn deliver(&self, event: InstallEvent) {
        match catch_unwind(AssertUnwindSafe(|| self.sink.emit(event))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Install event sink failed; continuing"),
            Err(_) => warn!("Install event sink panicked; continuing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavesync_core::testing::{RecordingSink, SinkBehavior};

    #[test]
    fn failing_sink_is_swallowed() {
        let sink = RecordingSink::with_behavior(SinkBehavior::Fail);
        let mut guard = SinkGuard::new(&sink);
        guard.state(InstallState::Preparing);
        guard.progress(InstallProgress::default());
        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn panicking_sink_is_swallowed() {
        let sink = RecordingSink::with_behavior(SinkBehavior::Panic);
        let guard = SinkGuard::new(&sink);
        guard.state(InstallState::Preparing);
        guard.state(InstallState::Download);
        assert_eq!(sink.states().len(), 2);
    }

    #[test]
    fn unchanged_progress_is_not_repeated() {
        let sink = RecordingSink::new();
        let mut guard = SinkGuard::new(&sink);
        let p = InstallProgress::seeded(1, 2, 3, 4);
        guard.progress(p);
        guard.progress_if_changed(p);
        assert_eq!(sink.progress().len(), 1);
    }
}
