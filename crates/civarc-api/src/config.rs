//! Public configuration for the civitai API client.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Configuration for the civitai API client.
///
/// # Example
///
/// ```
/// use civarc_api::ApiClientConfig;
/// use std::time::Duration;
///
/// let config = ApiClientConfig::new()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-archiver/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the versioned API (listing and detail endpoints hang off it)
    pub(crate) base_url: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Timeout for JSON (listing and detail) requests
    pub(crate) timeout: Duration,
    /// Retry policy for listing, detail and asset requests
    pub(crate) retry: RetryPolicy,
    /// Asset statuses that mean "permanently unavailable, skip"
    pub(crate) ignorable_status_codes: Vec<u16>,
}

/// Asset statuses skipped without retry unless configured otherwise.
pub const DEFAULT_IGNORABLE_STATUS_CODES: [u16; 3] = [401, 403, 404];

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://civitai.com/api/v1".to_string(),
            user_agent: concat!(
                "Mozilla/5.0 (X11; Linux x86_64) civarc/",
                env!("CARGO_PKG_VERSION")
            )
            .to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            ignorable_status_codes: DEFAULT_IGNORABLE_STATUS_CODES.to_vec(),
        }
    }
}

impl ApiClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the API.
    ///
    /// Defaults to `https://civitai.com/api/v1`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the timeout for listing and detail requests.
    ///
    /// Defaults to 30 seconds. Asset downloads are not bound by it.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy for listing and detail requests.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the asset status codes that are skipped instead of retried.
    #[must_use]
    pub fn with_ignorable_status_codes(mut self, codes: impl Into<Vec<u16>>) -> Self {
        self.ignorable_status_codes = codes.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub const fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn ignorable_status_codes(&self) -> &[u16] {
        &self.ignorable_status_codes
    }
}
