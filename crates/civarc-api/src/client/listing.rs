//! Page and detail fetches with the fixed retry policy.

use civarc_core::ListingPage;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ApiError;
use crate::http::HttpBackend;
use crate::retry::{RetryOutcome, retry};
use crate::url::{ResourceKind, build_detail_url};

use super::ApiClient;

/// A listing or detail request that may legitimately produce nothing.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Fetched(T),
    /// The server answered 404: the resource was removed.
    NotFound,
    /// Every attempt failed; the error was already logged.
    GaveUp,
}

impl<T> FetchOutcome<T> {
    /// The fetched value, if any.
    pub fn fetched(self) -> Option<T> {
        match self {
            Self::Fetched(value) => Some(value),
            Self::NotFound | Self::GaveUp => None,
        }
    }
}

fn is_not_found(err: &ApiError) -> bool {
    err.status() == Some(404)
}

impl<B: HttpBackend> ApiClient<B> {
    /// Fetch one listing page.
    ///
    /// A 404 is a terminal "no data" answer and is never retried. Any
    /// other failure goes through the retry policy.
    pub async fn fetch_page(&self, url: &Url) -> FetchOutcome<ListingPage> {
        debug!(%url, "Fetching listing page");
        self.fetch_json(url).await
    }

    /// Resolve a single item's record through the detail endpoint.
    pub async fn fetch_item(&self, kind: ResourceKind, id: u64) -> FetchOutcome<Value> {
        let url = build_detail_url(&self.base_url, kind, id);
        debug!(%url, id, kind = kind.noun(), "Fetching item detail");
        let outcome = self.fetch_json(&url).await;
        if matches!(outcome, FetchOutcome::NotFound) {
            info!(id, kind = kind.noun(), "Item not found, skipping");
        }
        outcome
    }

    pub async fn fetch_model(&self, id: u64) -> FetchOutcome<Value> {
        self.fetch_item(ResourceKind::Models, id).await
    }

    pub async fn fetch_image(&self, id: u64) -> FetchOutcome<Value> {
        self.fetch_item(ResourceKind::Images, id).await
    }

    async fn fetch_json<T>(&self, url: &Url) -> FetchOutcome<T>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        let timeout = self.config.timeout();
        let outcome = retry(
            self.config.retry,
            self.sleeper.as_ref(),
            url.as_str(),
            is_not_found,
            || self.backend.get_json::<T>(url, timeout),
        )
        .await;

        match outcome {
            RetryOutcome::Done(value) => FetchOutcome::Fetched(value),
            RetryOutcome::Skipped(_) => {
                warn!(%url, "Resource returned 404");
                FetchOutcome::NotFound
            }
            RetryOutcome::Exhausted { .. } => FetchOutcome::GaveUp,
        }
    }
}
