//! Client for the civitai public API.
//!
//! Wraps the HTTP capability behind the [`HttpBackend`] port, paginates the
//! model and image listings, resolves single items by id and owns the fixed
//! retry/backoff policy shared with the asset downloader.
#![deny(unsafe_code)]

mod client;
mod config;
mod error;
mod http;
mod retry;
mod url;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::{ApiClient, DefaultApiClient, FetchOutcome};

// Configuration
pub use config::{ApiClientConfig, DEFAULT_IGNORABLE_STATUS_CODES};

// Errors
pub use error::{ApiError, ApiResult};

// HTTP port
pub use http::{ByteStream, HttpBackend, HttpStream, ReqwestBackend};

// Retry policy
pub use retry::{RetryOutcome, RetryPolicy, Sleeper, TokioSleeper, retry};

// URLs
pub use self::url::{ResourceKind, build_detail_url, build_listing_url};
