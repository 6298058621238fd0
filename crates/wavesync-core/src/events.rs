//! Install events - discriminated union for all notifications to the host.

use serde::{Deserialize, Serialize};

use crate::domain::{InstallProgress, InstallState};

/// Single discriminated union for install notifications.
///
/// Serialized with a `type` tag:
///
/// ```json
/// { "type": "state_changed", "state": "download" }
/// { "type": "progress", "downloaded_count": 1, "total_count_to_download": 2,
///   "downloaded_bytes": 100, "total_bytes_to_download": 300 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallEvent {
    /// Coarse state transition.
    StateChanged {
        /// The state just entered.
        state: InstallState,
    },

    /// Fine-grained progress snapshot.
    Progress(InstallProgress),
}

impl InstallEvent {
    /// Create a state change event.
    #[must_use]
    pub const fn state(state: InstallState) -> Self {
        Self::StateChanged { state }
    }

    /// Create a progress event.
    #[must_use]
    pub const fn progress(progress: InstallProgress) -> Self {
        Self::Progress(progress)
    }

    /// The state carried by this event, if any.
    #[must_use]
    pub const fn as_state(&self) -> Option<InstallState> {
        match self {
            Self::StateChanged { state } => Some(*state),
            Self::Progress(_) => None,
        }
    }

    /// The progress carried by this event, if any.
    #[must_use]
    pub const fn as_progress(&self) -> Option<&InstallProgress> {
        match self {
            Self::Progress(p) => Some(p),
            Self::StateChanged { .. } => None,
        }
    }
}
