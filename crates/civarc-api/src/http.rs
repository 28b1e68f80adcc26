//! HTTP backend abstraction for the civitai API and asset hosts.
//!
//! The rest of the crate only sees the [`HttpBackend`] port: a single-shot
//! GET returning either parsed JSON or a streamable body. Retries live in
//! `retry`, not here, so every backend is exactly one request per call.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ApiClientConfig;
use crate::error::{ApiError, ApiResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Streamed response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = ApiResult<Bytes>> + Send>>;

/// A response whose body has not been read yet.
pub struct HttpStream {
    pub status: u16,
    /// `Content-Type` header, if present and valid UTF-8.
    pub content_type: Option<String>,
    pub body: ByteStream,
}

impl HttpStream {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

impl std::fmt::Debug for HttpStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStream")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Trait for HTTP backends able to talk to the remote site.
///
/// Implementations must get past whatever anti-automation checks the site
/// applies; callers treat that as opaque.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// GET a URL and deserialize its JSON body.
    ///
    /// Non-2xx responses become [`ApiError::InvalidStatusCode`].
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url, timeout: Duration)
    -> ApiResult<T>;

    /// GET a URL without an overall timeout and hand back the body stream.
    ///
    /// The status is reported as-is; interpreting it is up to the caller.
    async fn get_stream(&self, url: &Url) -> ApiResult<HttpStream>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &ApiClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .connect_timeout(config.timeout())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> ApiResult<T> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::InvalidStatusCode {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let data: T = response.json().await?;
        Ok(data)
    }

    async fn get_stream(&self, url: &Url) -> ApiResult<HttpStream> {
        let response = self.client.get(url.as_str()).send().await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(String::from);

        Ok(HttpStream {
            status: response.status().as_u16(),
            content_type,
            body: response.bytes_stream().map(|r| r.map_err(ApiError::from)).boxed(),
        })
    }
}
