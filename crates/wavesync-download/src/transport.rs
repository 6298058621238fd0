//! Reqwest-backed asset transport.
//!
//! The asset client is configured separately from the index client: no
//! transparent decompression (bytes on disk must match declared sizes), a
//! cookie store for CDNs that set session cookies, and bounded redirects.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::RANGE;
use reqwest::redirect::Policy;
use tracing::trace;
use wavesync_core::{HttpTransport, ResponseBody, TransportError, TransportRequest};

/// Configuration for the asset HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Maximum redirects followed per request
    pub max_redirects: usize,
    /// Keep cookies between requests
    pub cookie_store: bool,
    /// Accept gzip-encoded bodies and decode them
    pub gzip: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("wavesync/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(15),
            max_redirects: 10,
            cookie_store: true,
            gzip: false,
        }
    }
}

impl TransportConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the redirect limit.
    #[must_use]
    pub const fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }
}

/// Production [`HttpTransport`] using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the client.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::limited(config.max_redirects))
            .cookie_store(config.cookie_store)
            .gzip(config.gzip)
            .build()
            .map_err(|e| TransportError::network("<client>", e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: TransportRequest) -> Result<Box<dyn ResponseBody>, TransportError> {
        let url = request.url.to_string();
        let mut builder = self.client.get(request.url);
        if let Some(range) = request.range {
            builder = builder.header(RANGE, range.header_value());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(&url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::status(status.as_u16(), url));
        }
        trace!(url = %url, status = status.as_u16(), "Response headers received");

        Ok(Box::new(ReqwestBody { response, url }))
    }
}

struct ReqwestBody {
    response: reqwest::Response,
    url: String,
}

#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        self.response
            .chunk()
            .await
            .map_err(|e| TransportError::network(&self.url, e.to_string()))
    }

    fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }
}
