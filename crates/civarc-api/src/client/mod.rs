//! civitai client for paginated listings and single-item lookups.

mod listing;

use std::sync::Arc;

use url::Url;

use crate::config::ApiClientConfig;
use crate::error::ApiResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::url::{ResourceKind, build_listing_url};

pub use listing::FetchOutcome;

// ============================================================================
// Type Aliases
// ============================================================================

/// Default client using the reqwest HTTP backend.
pub type DefaultApiClient = ApiClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the civitai listing and detail endpoints.
///
/// Generic over the HTTP backend so tests can plug in a fake. The backend
/// and sleeper are shared with the asset downloader through
/// [`ApiClient::backend`] and [`ApiClient::sleeper`].
pub struct ApiClient<B: HttpBackend> {
    backend: Arc<B>,
    config: ApiClientConfig,
    base_url: Url,
    sleeper: Arc<dyn Sleeper>,
}

impl DefaultApiClient {
    /// Create a client talking to the real site.
    pub fn new(config: ApiClientConfig) -> ApiResult<Self> {
        let backend = ReqwestBackend::new(&config)?;
        Self::with_backend(config, Arc::new(backend))
    }
}

impl<B: HttpBackend> ApiClient<B> {
    /// Create a client over a custom backend.
    pub fn with_backend(config: ApiClientConfig, backend: Arc<B>) -> ApiResult<Self> {
        let base_url = Url::parse(config.base_url())?;
        Ok(Self {
            backend,
            config,
            base_url,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replace the sleeper used between retry attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    pub fn sleeper(&self) -> Arc<dyn Sleeper> {
        Arc::clone(&self.sleeper)
    }

    pub const fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    pub const fn retry_policy(&self) -> RetryPolicy {
        self.config.retry
    }

    /// First listing URL for `kind` with the caller's query parameters.
    pub fn listing_url(&self, kind: ResourceKind, params: &[String]) -> Url {
        build_listing_url(&self.base_url, kind, params)
    }
}
