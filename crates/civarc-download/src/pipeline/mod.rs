//! Sequential archive passes.
//!
//! One page, one item, one asset at a time. Per-item failures are logged
//! and counted; only trouble with the archive root ends a pass early.

mod cursor;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, error, info};

use civarc_api::{ApiClient, HttpBackend, ResourceKind};
use civarc_core::{MetadataLayout, MetadataStore, ensure_root};

use crate::archive::{ArchiveDeps, ImageArchive, ModelArchive};
use crate::downloader::AssetDownloader;
use crate::error::DownloadResult;
use crate::options::ArchiveOptions;
use crate::summary::{ItemOutcome, RunSummary};

pub use cursor::{ListingSource, PageCursor, layout_for};

pub struct Pipeline<B: HttpBackend> {
    client: ApiClient<B>,
    deps: ArchiveDeps<B>,
}

impl<B: HttpBackend> Pipeline<B> {
    /// Build a pipeline archiving below `root`. Asset downloads share the
    /// client's backend, sleeper, retry policy and ignorable statuses.
    pub fn new(client: ApiClient<B>, root: impl Into<PathBuf>, options: ArchiveOptions) -> Self {
        let deps = ArchiveDeps {
            root: root.into(),
            downloader: AssetDownloader::from_client(&client),
            options,
            ignorable_status_codes: client.config().ignorable_status_codes().to_vec(),
        };
        Self { client, deps }
    }

    pub fn root(&self) -> &Path {
        &self.deps.root
    }

    pub const fn options(&self) -> &ArchiveOptions {
        &self.deps.options
    }

    /// Archive every model of `source`, verifying each version right after
    /// its download when `verify` is set.
    pub async fn download_models(
        &self,
        source: &ListingSource,
        verify: bool,
    ) -> DownloadResult<RunSummary> {
        ensure_root(self.root())?;
        let mut cursor = PageCursor::open(&self.client, ResourceKind::Models, source, self.root())?;

        let mut summary = RunSummary::default();
        while let Some(page) = cursor.next_page().await {
            for raw in page.items {
                let outcome = self.archive_model(raw, source.is_replay(), verify).await;
                summary.record(&outcome);
            }
        }

        summary.log("download models");
        Ok(summary)
    }

    /// Verify every model archived below the root, pruning superseded
    /// versions under latest-only.
    pub async fn verify_models(&self) -> RunSummary {
        let store = MetadataStore::new(self.root(), MetadataLayout::ModelDirectories);
        let mut summary = RunSummary::default();

        for raw in store.load_all().items {
            let archive = match ModelArchive::from_value(&self.deps, raw) {
                Ok(archive) => archive,
                Err(e) => {
                    error!(error = %e, "Skipping unreadable model metadata");
                    summary.record(&ItemOutcome::ParseError);
                    continue;
                }
            };

            info!(model_id = archive.id(), "Verifying model");
            let outcome = match archive.verify().await {
                Ok(report) => ItemOutcome::Archived(report),
                Err(e) => {
                    error!(model_id = archive.id(), error = %e, "Failed to verify model");
                    ItemOutcome::Failed
                }
            };
            summary.record(&outcome);
        }

        summary.log("verify models");
        summary
    }

    /// Archive every image of `source`.
    pub async fn download_images(
        &self,
        source: &ListingSource,
        verify: bool,
    ) -> DownloadResult<RunSummary> {
        ensure_root(self.root())?;
        let mut cursor = PageCursor::open(&self.client, ResourceKind::Images, source, self.root())?;

        let mut summary = RunSummary::default();
        while let Some(page) = cursor.next_page().await {
            for raw in page.items {
                let outcome = self.archive_image(raw, source.is_replay(), verify).await;
                summary.record(&outcome);
            }
        }

        summary.log("download images");
        Ok(summary)
    }

    /// Check that every image with stored metadata has its file.
    pub fn verify_images(&self) -> RunSummary {
        let store = MetadataStore::new(self.root(), MetadataLayout::FlatFiles);
        let mut summary = RunSummary::default();

        for raw in store.load_all().items {
            let outcome = match ImageArchive::from_value(&self.deps, raw) {
                Ok(archive) => ItemOutcome::Archived(archive.verify()),
                Err(e) => {
                    error!(error = %e, "Skipping unreadable image metadata");
                    ItemOutcome::ParseError
                }
            };
            summary.record(&outcome);
        }

        summary.log("verify images");
        summary
    }

    async fn archive_model(&self, raw: Value, replayed: bool, verify: bool) -> ItemOutcome {
        let archive = match ModelArchive::from_value(&self.deps, raw) {
            Ok(archive) => archive,
            Err(e) => {
                error!(error = %e, "Skipping malformed model");
                return ItemOutcome::ParseError;
            }
        };
        if !self.deps.options.admits(archive.record().nsfw) {
            debug!(model_id = archive.id(), "Not NSFW, skipping");
            return ItemOutcome::Filtered;
        }
        let archive = if replayed { archive.replayed() } else { archive };

        let result = match archive.new_model() {
            Ok(()) => archive.run(verify).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(report) => ItemOutcome::Archived(report),
            Err(e) => {
                error!(model_id = archive.id(), error = %e, "Failed to archive model");
                ItemOutcome::Failed
            }
        }
    }

    async fn archive_image(&self, raw: Value, replayed: bool, verify: bool) -> ItemOutcome {
        let archive = match ImageArchive::from_value(&self.deps, raw) {
            Ok(archive) => archive,
            Err(e) => {
                error!(error = %e, "Skipping malformed image");
                return ItemOutcome::ParseError;
            }
        };
        if !self.deps.options.admits(archive.record().nsfw) {
            debug!(image_id = archive.id(), "Not NSFW, skipping");
            return ItemOutcome::Filtered;
        }
        let archive = if replayed { archive.replayed() } else { archive };

        if let Err(e) = archive.new_image() {
            error!(image_id = archive.id(), error = %e, "Failed to archive image");
            return ItemOutcome::Failed;
        }
        let mut report = archive.run().await;
        if verify {
            report.merge(archive.verify());
        }
        ItemOutcome::Archived(report)
    }
}
