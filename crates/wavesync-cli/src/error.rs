//! CLI-specific error types and mappings.
//!
//! Maps [`InstallError`] to sysexits-style exit codes and user-facing
//! messages.

use thiserror::Error;
use wavesync_core::InstallError;
use wavesync_index::IndexError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Run failure not covered by a more specific variant.
    #[error("{0}")]
    Install(String),

    /// Argument error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A remote document or asset could not be obtained.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Downloaded data failed verification.
    #[error("Data error: {0}")]
    Data(String),

    /// The run was cancelled.
    #[error("Cancelled")]
    Cancelled,
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where a category fits; cancellation
    /// uses the shell's SIGINT convention.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Install(_) => 1,
            Self::Arguments(_) => 64,   // EX_USAGE
            Self::Data(_) => 65,        // EX_DATAERR
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,          // EX_IOERR
            Self::Config(_) => 78,      // EX_CONFIG
            Self::Cancelled => 130,
        }
    }
}

impl From<InstallError> for CliError {
    fn from(err: InstallError) -> Self {
        let message = err.to_string();
        match err {
            InstallError::Cancelled => Self::Cancelled,
            InstallError::InstallPathMissing | InstallError::Config { .. } => Self::Config(message),
            InstallError::IndexUnavailable { .. } | InstallError::DownloadExhausted { .. } => {
                Self::Unavailable(message)
            }
            InstallError::ChecksumMismatch { .. } => Self::Data(message),
            InstallError::Io { .. } => Self::Io(message),
            InstallError::NotInitialized { .. } => Self::Install(message),
        }
    }
}

impl From<IndexError> for CliError {
    fn from(err: IndexError) -> Self {
        InstallError::from(err).into()
    }
}
