//! Internal error types for index and launcher fetches.
//!
//! These errors are internal to `wavesync-index` and are mapped to
//! `InstallError` at the boundary.

use thiserror::Error;
use wavesync_core::InstallError;

/// Result type alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors related to fetching and parsing remote documents.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Request failed with an HTTP error status.
    #[error("request failed with status {status}: {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Network or HTTP client error.
    #[error("network error for {url}: {message}")]
    Network {
        /// The URL that was requested
        url: String,
        /// Underlying error message
        message: String,
    },

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Every candidate URL answered 404.
    #[error("no index found at {url} or its alternatives")]
    Exhausted {
        /// The configured index URL
        url: String,
    },

    /// The launcher document lacks a required field.
    #[error("launcher config is missing '{field}'")]
    MissingField {
        /// Dotted path of the missing field
        field: String,
    },
}

impl IndexError {
    /// Whether the server answered 404.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    pub(crate) fn network(url: impl Into<String>, err: &reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            message: err.to_string(),
        }
    }
}

impl From<IndexError> for InstallError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::MissingField { .. } | IndexError::InvalidUrl(_) => {
                Self::config(err.to_string())
            }
            other => Self::index_unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let error = IndexError::Status {
            status: 404,
            url: "https://cdn.example.com/indexFile.json".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("cdn.example.com"));
        assert!(error.is_not_found());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let error: IndexError = json_err.into();
        assert!(matches!(error, IndexError::Json(_)));
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_mapping_to_install_error() {
        let missing: InstallError = IndexError::MissingField {
            field: "default.config.version".into(),
        }
        .into();
        assert!(matches!(missing, InstallError::Config { .. }));

        let status: InstallError = IndexError::Status {
            status: 503,
            url: "u".into(),
        }
        .into();
        assert!(matches!(status, InstallError::IndexUnavailable { .. }));
    }
}
