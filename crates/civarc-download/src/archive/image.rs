//! A standalone image: `<root>/<imageId>.json` next to `<root>/<imageId>.<ext>`.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, error, info};

use civarc_api::HttpBackend;
use civarc_core::{
    FileHealth, ImageRecord, MetadataLayout, MetadataStore, PersistOutcome, ensure_directory,
};

use super::{ArchiveDeps, image_source_url};
use crate::downloader::{detected_extensions, with_appended_extension};
use crate::error::DownloadResult;
use crate::summary::ArchiveReport;

pub struct ImageArchive<'a, B: HttpBackend> {
    deps: &'a ArchiveDeps<B>,
    record: ImageRecord,
    replayed: bool,
}

impl<'a, B: HttpBackend> ImageArchive<'a, B> {
    pub const fn from_record(deps: &'a ArchiveDeps<B>, record: ImageRecord) -> Self {
        Self {
            deps,
            record,
            replayed: false,
        }
    }

    pub fn from_value(deps: &'a ArchiveDeps<B>, raw: Value) -> DownloadResult<Self> {
        Ok(Self::from_record(deps, ImageRecord::from_value(raw)?))
    }

    #[must_use]
    pub const fn replayed(mut self) -> Self {
        self.replayed = true;
        self
    }

    pub const fn id(&self) -> u64 {
        self.record.id
    }

    pub const fn record(&self) -> &ImageRecord {
        &self.record
    }

    /// Downloaded files of this image: `<root>/<id>` bare or with one of
    /// the detected extensions. The metadata side file is never a candidate.
    pub fn existing_files(&self) -> Vec<PathBuf> {
        let stem = self.deps.root.join(self.record.id.to_string());
        std::iter::once(stem.clone())
            .chain(detected_extensions().map(|ext| with_appended_extension(&stem, ext)))
            .filter(|path| path.is_file())
            .collect()
    }

    /// Ensure the root exists and persist the image metadata.
    pub fn new_image(&self) -> DownloadResult<()> {
        ensure_directory(&self.deps.root)?;
        if self.replayed {
            return Ok(());
        }

        let store = MetadataStore::new(&self.deps.root, MetadataLayout::FlatFiles);
        match store.persist(self.record.id, self.record.raw(), self.deps.options.refresh_metadata)? {
            PersistOutcome::Written => info!(image_id = self.record.id, "Saved metadata"),
            PersistOutcome::Kept => debug!(image_id = self.record.id, "Keeping existing metadata"),
        }
        Ok(())
    }

    /// Download the image unless it is already archived.
    pub async fn run(&self) -> ArchiveReport {
        let mut report = ArchiveReport::default();
        if self.deps.options.metadata_only {
            return report;
        }

        if !self.existing_files().is_empty() {
            report.assets.already_present += 1;
            return report;
        }

        let target = self.deps.root.join(self.record.id.to_string());
        info!(image_id = self.record.id, path = %target.display(), "Downloading image");
        let url = image_source_url(&self.record.image, self.deps.options.original_image);
        let outcome = self
            .deps
            .downloader
            .download(&url, &target, true, &self.deps.ignorable_status_codes)
            .await;
        report.assets.record(&outcome);
        report
    }

    /// Presence check. Images carry no content hash.
    pub fn verify(&self) -> ArchiveReport {
        let mut report = ArchiveReport::default();
        let health = if self.existing_files().is_empty() {
            error!(image_id = self.record.id, "Image does not exist");
            FileHealth::Missing
        } else {
            FileHealth::Present
        };
        report.verification.record(&health);
        report
    }
}

#[cfg(test)]
mod tests {
    use civarc_api::testing::{CannedResponse, FakeBackend};
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::archive::test_support::deps;
    use crate::options::ArchiveOptions;

    fn image_json() -> Value {
        json!({
            "id": 501,
            "url": "https://image.civitai.com/x/uuid/width=450/501.jpeg",
            "hash": "U5Eo",
            "width": 1024,
            "nsfw": "None"
        })
    }

    #[tokio::test]
    async fn test_new_image_writes_flat_metadata() {
        let temp = tempdir().unwrap();
        let backend = FakeBackend::new();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new());

        ImageArchive::from_value(&deps, image_json())
            .unwrap()
            .new_image()
            .unwrap();

        let stored: Value =
            serde_json::from_str(&std::fs::read_to_string(temp.path().join("501.json")).unwrap())
                .unwrap();
        assert_eq!(stored["id"], 501);
    }

    #[tokio::test]
    async fn test_run_downloads_once_with_detected_extension() {
        let temp = tempdir().unwrap();
        let backend =
            FakeBackend::new().with_response("501.jpeg", CannedResponse::body("image/jpeg", b"jpg"));
        let deps = deps(temp.path(), &backend, ArchiveOptions::new());

        let archive = ImageArchive::from_value(&deps, image_json()).unwrap();
        archive.new_image().unwrap();

        let first = archive.run().await;
        assert_eq!(first.assets.downloaded, 1);
        assert!(temp.path().join("501.jpg").is_file());

        let second = archive.run().await;
        assert_eq!(second.assets.already_present, 1);
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_metadata_file_does_not_count_as_image() {
        let temp = tempdir().unwrap();
        let backend = FakeBackend::new();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new());

        let archive = ImageArchive::from_value(&deps, image_json()).unwrap();
        archive.new_image().unwrap();

        assert!(archive.existing_files().is_empty());
        assert_eq!(archive.verify().verification.missing, 1);
    }

    #[test]
    fn test_existing_files_only_probes_the_image_stem() {
        let temp = tempdir().unwrap();
        let backend = FakeBackend::new();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new());
        let archive = ImageArchive::from_value(&deps, image_json()).unwrap();

        std::fs::create_dir_all(temp.path().join("nested")).unwrap();
        std::fs::write(temp.path().join("nested").join("501.jpg"), b"jpg").unwrap();
        std::fs::write(temp.path().join("5010.png"), b"png").unwrap();
        assert!(archive.existing_files().is_empty());

        std::fs::write(temp.path().join("501.webp"), b"webp").unwrap();
        std::fs::write(temp.path().join("501"), b"raw").unwrap();
        assert_eq!(
            archive.existing_files(),
            vec![temp.path().join("501"), temp.path().join("501.webp")]
        );
    }

    #[tokio::test]
    async fn test_original_image_requests_full_width() {
        let temp = tempdir().unwrap();
        let backend =
            FakeBackend::new().with_response("width=1024", CannedResponse::body("image/png", b"png"));
        let deps = deps(temp.path(), &backend, ArchiveOptions::new().with_original_image(true));

        let archive = ImageArchive::from_value(&deps, image_json()).unwrap();
        archive.new_image().unwrap();
        archive.run().await;

        assert_eq!(
            backend.requests(),
            vec!["https://image.civitai.com/x/uuid/width=1024/501.jpeg".to_string()]
        );
        assert_eq!(archive.verify().verification.present, 1);
    }
}
