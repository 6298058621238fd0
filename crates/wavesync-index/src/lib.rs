#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod cache;
mod config;
mod error;
mod http;
mod launcher;
mod parsing;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Cache and launcher client
pub use cache::ResourceIndexCache;
pub use launcher::LauncherConfigClient;

// Configuration
pub use config::{DEFAULT_CACHE_DURATION, IndexClientConfig};

// Errors
pub use error::{IndexError, IndexResult};

// HTTP backend seam
pub use http::{IndexBackend, ReqwestIndexBackend};

// Parsing and URL helpers
pub use parsing::{LauncherDocument, parse_launcher_document, parse_resource_index};
pub use crate::url::{build_index_candidates, build_index_url, parse_index_url};

/// In-memory backend for tests.
#[cfg(any(test, feature = "test-utils"))]
pub use http::testing;
