//! Public configuration for the index and launcher clients.

use std::time::Duration;

/// How long a fetched index stays fresh.
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(10 * 60);

/// Configuration for the index client.
///
/// # Example
///
/// ```
/// use wavesync_index::IndexClientConfig;
/// use std::time::Duration;
///
/// let config = IndexClientConfig::new()
///     .with_launcher_url("https://launcher.example.com/game/G153/config.json")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct IndexClientConfig {
    /// Launcher document URL.
    pub(crate) launcher_url: Option<String>,
    /// Prefix the launcher's `indexFile` is appended to.
    pub(crate) asset_base_url: Option<String>,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Freshness window of a fetched index
    pub(crate) cache_duration: Duration,
}

impl Default for IndexClientConfig {
    fn default() -> Self {
        Self {
            launcher_url: None,
            asset_base_url: None,
            user_agent: concat!("wavesync-index/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            cache_duration: DEFAULT_CACHE_DURATION,
        }
    }
}

impl IndexClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the launcher document URL.
    #[must_use]
    pub fn with_launcher_url(mut self, url: impl Into<String>) -> Self {
        self.launcher_url = Some(url.into());
        self
    }

    /// Set the prefix the index file name is appended to.
    ///
    /// Defaults to the directory of the launcher URL.
    #[must_use]
    pub fn with_asset_base_url(mut self, url: impl Into<String>) -> Self {
        self.asset_base_url = Some(url.into());
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how long a fetched index is served without refetching.
    ///
    /// Defaults to 10 minutes.
    #[must_use]
    pub const fn with_cache_duration(mut self, duration: Duration) -> Self {
        self.cache_duration = duration;
        self
    }

    /// The configured launcher URL, if any.
    #[must_use]
    pub fn launcher_url(&self) -> Option<&str> {
        self.launcher_url.as_deref()
    }

    /// The configured freshness window.
    #[must_use]
    pub const fn cache_duration(&self) -> Duration {
        self.cache_duration
    }
}
