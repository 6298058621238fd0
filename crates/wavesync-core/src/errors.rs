//! Install error types.
//!
//! These errors are designed to be serializable and not depend on external
//! error types like `std::io::Error`. For I/O errors, we capture the kind
//! and message as strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for a whole install/update/preload run.
///
/// Any of these aborts the run. Cancellation is kept distinct so hosts can
/// unwind quietly instead of reporting a failure.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum InstallError {
    /// The resource index could not be obtained, even after a forced refresh.
    #[error("Resource index unavailable: {message}")]
    IndexUnavailable {
        /// What went wrong.
        message: String,
    },

    /// The installer was used before the remote game config was fetched.
    #[error("Installer not initialized: {message}")]
    NotInitialized {
        /// What is missing.
        message: String,
    },

    /// No install directory was configured.
    #[error("Install path is not set")]
    InstallPathMissing,

    /// The primary URL and every fallback URL failed.
    #[error("Download failed for {destination} after {attempts} attempt(s): {message}")]
    DownloadExhausted {
        /// Manifest destination of the entry.
        destination: String,
        /// Number of URLs tried.
        attempts: u32,
        /// HTTP status of the last failure, if it was a status failure.
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
        /// Last failure message.
        message: String,
    },

    /// The downloaded file does not match the declared checksum.
    ///
    /// The file is left on disk for inspection.
    #[error("Checksum mismatch for {destination}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Manifest destination of the entry.
        destination: String,
        /// Declared checksum.
        expected: String,
        /// Computed checksum.
        actual: String,
    },

    /// I/O error during file operations.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "not found", "permission denied").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Detailed error message.
        message: String,
    },

    /// The run was cancelled.
    #[error("Install cancelled")]
    Cancelled,
}

impl InstallError {
    /// Create an index-unavailable error.
    pub fn index_unavailable(message: impl Into<String>) -> Self {
        Self::IndexUnavailable {
            message: message.into(),
        }
    }

    /// Create a not-initialized error.
    pub fn not_initialized(message: impl Into<String>) -> Self {
        Self::NotInitialized {
            message: message.into(),
        }
    }

    /// Create a download-exhausted error.
    pub fn download_exhausted(
        destination: impl Into<String>,
        attempts: u32,
        status_code: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::DownloadExhausted {
            destination: destination.into(),
            attempts,
            status_code,
            message: message.into(),
        }
    }

    /// Create a checksum-mismatch error.
    pub fn checksum_mismatch(
        destination: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ChecksumMismatch {
            destination: destination.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an I/O error from kind and message strings.
    pub fn io(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    ///
    /// This captures the error kind name and message for serialization.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Everything except cancellation is reported to the host as a failure.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_cancelled()
    }

    /// Convert to a user-friendly message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::IndexUnavailable { .. } => {
                "The resource index could not be downloaded. Check your connection and try again."
                    .to_string()
            }
            Self::NotInitialized { message } => format!("Installer is not ready: {message}"),
            Self::InstallPathMissing => "Choose an install directory first.".to_string(),
            Self::DownloadExhausted {
                destination,
                status_code: Some(code),
                ..
            } => format!("Could not download {destination} (HTTP {code})."),
            Self::DownloadExhausted { destination, .. } => {
                format!("Could not download {destination}.")
            }
            Self::ChecksumMismatch { destination, .. } => {
                format!("{destination} is corrupted after download. Run the install again.")
            }
            Self::Io { message, .. } => format!("File operation failed: {message}"),
            Self::Config { message } => format!("Invalid configuration: {message}"),
            Self::Cancelled => "Install was cancelled.".to_string(),
        }
    }
}

/// Convenience result type for install operations.
pub type InstallResult<T> = Result<T, InstallError>;
