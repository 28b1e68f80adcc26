//! Uniform page iteration over the three listing sources.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use url::Url;

use civarc_api::{ApiClient, FetchOutcome, HttpBackend, ResourceKind};
use civarc_core::{ListingPage, MetadataLayout, MetadataStore, load_ids_from_file};

use crate::error::DownloadResult;

/// Where listing items come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    /// Paginate the live listing endpoint, starting with these query
    /// parameters.
    Api { params: Vec<String> },
    /// Replay the metadata files of a previous session.
    Metadata,
    /// Resolve every id or URL listed in a file through the detail endpoint.
    IdFile(PathBuf),
}

impl ListingSource {
    pub const fn is_replay(&self) -> bool {
        matches!(self, Self::Metadata)
    }
}

/// Metadata layout used for items of `kind`.
pub const fn layout_for(kind: ResourceKind) -> MetadataLayout {
    match kind {
        ResourceKind::Models => MetadataLayout::ModelDirectories,
        ResourceKind::Images => MetadataLayout::FlatFiles,
    }
}

enum CursorState {
    Remote(Url),
    Replay(ListingPage),
    Ids(std::vec::IntoIter<u64>),
    Done,
}

/// Yields listing pages until the source is exhausted.
///
/// Remote pages follow `nextPage` and stop when it is absent or a fetch
/// ends without data. Id files yield one single-item page per resolvable id.
pub struct PageCursor<'a, B: HttpBackend> {
    client: &'a ApiClient<B>,
    kind: ResourceKind,
    state: CursorState,
}

impl<'a, B: HttpBackend> PageCursor<'a, B> {
    pub fn open(
        client: &'a ApiClient<B>,
        kind: ResourceKind,
        source: &ListingSource,
        root: &Path,
    ) -> DownloadResult<Self> {
        let state = match source {
            ListingSource::Api { params } => CursorState::Remote(client.listing_url(kind, params)),
            ListingSource::Metadata => {
                CursorState::Replay(MetadataStore::new(root, layout_for(kind)).load_all())
            }
            ListingSource::IdFile(path) => {
                let ids = load_ids_from_file(path)?;
                info!(path = %path.display(), count = ids.len(), "Loaded ids");
                CursorState::Ids(ids.into_iter())
            }
        };
        Ok(Self {
            client,
            kind,
            state,
        })
    }

    pub async fn next_page(&mut self) -> Option<ListingPage> {
        match std::mem::replace(&mut self.state, CursorState::Done) {
            CursorState::Done => None,
            CursorState::Replay(page) => {
                info!(total_items = page.items.len(), "Replaying stored metadata");
                Some(page)
            }
            CursorState::Remote(url) => {
                let FetchOutcome::Fetched(page) = self.client.fetch_page(&url).await else {
                    return None;
                };
                let meta = &page.metadata;
                info!(
                    "Total Items: {}, Page: [{}/{}]",
                    meta.total_items, meta.current_page, meta.total_pages
                );

                if let Some(next) = page.next_page() {
                    match Url::parse(next) {
                        Ok(next) => self.state = CursorState::Remote(next),
                        Err(e) => warn!(next, error = %e, "Unusable nextPage, stopping"),
                    }
                }
                Some(page)
            }
            CursorState::Ids(mut ids) => loop {
                let id = ids.next()?;
                if let FetchOutcome::Fetched(item) = self.client.fetch_item(self.kind, id).await {
                    self.state = CursorState::Ids(ids);
                    return Some(ListingPage::single(vec![item]));
                }
            },
        }
    }
}
