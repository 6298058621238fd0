//! HTTP transport port.
//!
//! A deliberately small surface: one streamed GET with an optional byte
//! range. Retries and fallback are layered above this by the installer.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use url::Url;

use crate::domain::ChunkRange;

/// Inclusive byte range for a `Range` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset.
    pub start: u64,
    /// Last byte offset, inclusive.
    pub end: u64,
}

impl ByteRange {
    /// Create a range covering `start..=end`.
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Value for the `Range` header, e.g. `bytes=0-1023`.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl From<&ChunkRange> for ByteRange {
    fn from(chunk: &ChunkRange) -> Self {
        Self::new(chunk.start, chunk.end)
    }
}

/// A single GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Absolute URL.
    pub url: Url,
    /// Optional byte range.
    pub range: Option<ByteRange>,
}

impl TransportRequest {
    /// Plain GET of the whole resource.
    #[must_use]
    pub const fn get(url: Url) -> Self {
        Self { url, range: None }
    }

    /// Restrict the request to a byte range.
    #[must_use]
    pub const fn with_range(mut self, range: ByteRange) -> Self {
        self.range = Some(range);
        self
    }
}

/// Transport failure classification.
///
/// `Status` and `Network` are HTTP-classified and may be retried against a
/// fallback URL. `Cancelled` never is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Connection, DNS, TLS or mid-body stream failure.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Underlying error message.
        message: String,
    },

    /// The request was abandoned because the run was cancelled.
    #[error("transfer cancelled")]
    Cancelled,
}

impl TransportError {
    /// Create a status error.
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a network error.
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Whether this failure should move on to the next fallback URL.
    #[must_use]
    pub const fn is_http_classified(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Network { .. })
    }

    /// HTTP status code, for status failures.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Streamed response body.
#[async_trait]
pub trait ResponseBody: Send {
    /// Next chunk of the body, `None` at end of stream.
    async fn chunk(&mut self) -> Result<Option<Bytes>, TransportError>;

    /// HTTP status of the response, 206 for an honoured range request.
    fn status(&self) -> u16;

    /// Declared content length, if the server sent one.
    fn content_length(&self) -> Option<u64> {
        None
    }
}

/// Streamed HTTP GET.
///
/// Implementations return non-success statuses as [`TransportError::Status`]
/// rather than as a body.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue the request and return the body stream.
    async fn get(&self, request: TransportRequest) -> Result<Box<dyn ResponseBody>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_header_is_inclusive() {
        assert_eq!(ByteRange::new(0, 1023).header_value(), "bytes=0-1023");
        let chunk = ChunkRange::new(100, 199);
        assert_eq!(ByteRange::from(&chunk).header_value(), "bytes=100-199");
    }

    #[test]
    fn classification() {
        assert!(TransportError::status(404, "u").is_http_classified());
        assert!(TransportError::status(404, "u").is_not_found());
        assert!(TransportError::network("u", "reset").is_http_classified());
        assert!(!TransportError::Cancelled.is_http_classified());
        assert_eq!(TransportError::status(503, "u").status_code(), Some(503));
        assert_eq!(TransportError::network("u", "x").status_code(), None);
    }
}
