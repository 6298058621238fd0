//! HTTP backend abstraction for remote documents.
//!
//! Index and launcher documents are small, so the backend returns the
//! whole body. The production implementation uses reqwest with gzip
//! decoding and no cookie store.

use async_trait::async_trait;
use url::Url;

use crate::config::IndexClientConfig;
use crate::error::{IndexError, IndexResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that fetch whole documents.
///
/// Non-success statuses are returned as [`IndexError::Status`].
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// GET a URL and return the full body.
    async fn get_bytes(&self, url: &Url) -> IndexResult<Vec<u8>>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
pub struct ReqwestIndexBackend {
    client: reqwest::Client,
}

impl ReqwestIndexBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &IndexClientConfig) -> IndexResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| IndexError::network("<client>", &e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl IndexBackend for ReqwestIndexBackend {
    async fn get_bytes(&self, url: &Url) -> IndexResult<Vec<u8>> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| IndexError::network(url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| IndexError::network(url.as_str(), &e))?;
        Ok(body.to_vec())
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Canned response for the fake backend.
    #[derive(Clone, Debug)]
    pub enum CannedResponse {
        /// Successful response with this body.
        Body(String),
        /// Non-success status.
        Status(u16),
        /// Transport failure.
        Network(String),
    }

    /// A fake HTTP backend that returns canned responses by exact URL.
    ///
    /// Unknown URLs answer 404.
    #[derive(Clone, Default)]
    pub struct FakeBackend {
        responses: Arc<Mutex<HashMap<String, CannedResponse>>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        /// Create a new fake backend.
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve a JSON body at `url`.
        #[must_use]
        pub fn with_json(self, url: &str, body: impl Into<String>) -> Self {
            self.set(url, CannedResponse::Body(body.into()));
            self
        }

        /// Answer `status` at `url`.
        #[must_use]
        pub fn with_status(self, url: &str, status: u16) -> Self {
            self.set(url, CannedResponse::Status(status));
            self
        }

        /// Replace the response for `url`.
        pub fn set(&self, url: &str, response: CannedResponse) {
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(url.to_string(), response);
        }

        /// URLs requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    #[async_trait]
    impl IndexBackend for FakeBackend {
        async fn get_bytes(&self, url: &Url) -> IndexResult<Vec<u8>> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(url.to_string());

            let response = self
                .responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(url.as_str())
                .cloned();

            match response {
                Some(CannedResponse::Body(body)) => Ok(body.into_bytes()),
                Some(CannedResponse::Status(status)) => Err(IndexError::Status {
                    status,
                    url: url.to_string(),
                }),
                Some(CannedResponse::Network(message)) => Err(IndexError::Network {
                    url: url.to_string(),
                    message,
                }),
                None => Err(IndexError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }
}
