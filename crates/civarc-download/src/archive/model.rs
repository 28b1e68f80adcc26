//! A model and its versions: `<root>/<modelId>/`.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use civarc_api::HttpBackend;
use civarc_core::{
    MetadataLayout, MetadataStore, ModelRecord, PersistOutcome, ensure_directory, model_dir,
};

use super::{ArchiveDeps, VersionArchive};
use crate::error::DownloadResult;
use crate::summary::ArchiveReport;

pub struct ModelArchive<'a, B: HttpBackend> {
    deps: &'a ArchiveDeps<B>,
    record: ModelRecord,
    dir: PathBuf,
    /// Versions to download and verify, newest first.
    active: Vec<VersionArchive<'a, B>>,
    /// Older versions under latest-only, removed by `verify` when on disk.
    superseded: Vec<VersionArchive<'a, B>>,
    replayed: bool,
}

impl<'a, B: HttpBackend> ModelArchive<'a, B> {
    pub fn from_record(deps: &'a ArchiveDeps<B>, record: ModelRecord) -> Self {
        let keep = if deps.options.latest_only {
            1
        } else {
            record.versions.len()
        };

        let mut active = Vec::new();
        let mut superseded = Vec::new();
        for (index, version) in record.versions.iter().enumerate() {
            let archive = VersionArchive::new(deps, record.id, version.clone());
            if index < keep {
                active.push(archive);
            } else {
                superseded.push(archive);
            }
        }

        Self {
            deps,
            dir: model_dir(&deps.root, record.id),
            record,
            active,
            superseded,
            replayed: false,
        }
    }

    /// Parse a raw listing item.
    pub fn from_value(deps: &'a ArchiveDeps<B>, raw: Value) -> DownloadResult<Self> {
        Ok(Self::from_record(deps, ModelRecord::from_value(raw)?))
    }

    /// Mark the record as read back from its own metadata file, which is then
    /// never rewritten.
    #[must_use]
    pub const fn replayed(mut self) -> Self {
        self.replayed = true;
        self
    }

    pub const fn id(&self) -> u64 {
        self.record.id
    }

    pub const fn record(&self) -> &ModelRecord {
        &self.record
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn versions(&self) -> &[VersionArchive<'a, B>] {
        &self.active
    }

    /// Create the model directory and persist its metadata.
    pub fn new_model(&self) -> DownloadResult<()> {
        ensure_directory(&self.dir)?;
        if self.replayed {
            return Ok(());
        }

        let store = MetadataStore::new(&self.deps.root, MetadataLayout::ModelDirectories);
        match store.persist(self.record.id, self.record.raw(), self.deps.options.refresh_metadata)? {
            PersistOutcome::Written => info!(model_id = self.record.id, "Saved metadata"),
            PersistOutcome::Kept => debug!(model_id = self.record.id, "Keeping existing metadata"),
        }
        Ok(())
    }

    /// Download the assets of the active versions, verifying each version
    /// right after it when `verify` is set.
    pub async fn run(&self, verify: bool) -> DownloadResult<ArchiveReport> {
        let mut report = ArchiveReport::default();
        if self.deps.options.metadata_only {
            return Ok(report);
        }

        for version in &self.active {
            version.prepare()?;
            report.assets.merge(version.run().await);
            if verify {
                report.verification.merge(version.verify().await);
            }
        }
        Ok(report)
    }

    /// Verify the active versions, then delete superseded versions still on
    /// disk.
    pub async fn verify(&self) -> DownloadResult<ArchiveReport> {
        let mut report = ArchiveReport::default();
        for version in &self.active {
            report.verification.merge(version.verify().await);
        }

        for version in &self.superseded {
            if version.remove()? {
                report.pruned += 1;
            }
        }
        Ok(report)
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

    fn model_json() -> Value {
        json!({
            "id": 10,
            "nsfw": false,
            "modelVersions": [
                {
                    "id": 100,
                    "createdAt": "2023-01-01T00:00:00.000Z",
                    "files": [{
                        "name": "old.safetensors",
                        "downloadUrl": "https://civitai.com/api/download/models/100",
                        "hashes": {}
                    }],
                    "images": []
                },
                {
                    "id": 200,
                    "createdAt": "2024-01-01T00:00:00.000Z",
                    "files": [{
                        "name": "new.safetensors",
                        "downloadUrl": "https://civitai.com/api/download/models/200",
                        "hashes": {}
                    }],
                    "images": []
                }
            ]
        })
    }

    fn backend() -> FakeBackend {
        FakeBackend::new()
            .with_response("models/100", CannedResponse::body("application/octet-stream", b"old"))
            .with_response("models/200", CannedResponse::body("application/octet-stream", b"new"))
    }

    #[tokio::test]
    async fn test_versions_are_newest_first() {
        let temp = tempdir().unwrap();
        let backend = backend();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new());

        let archive = ModelArchive::from_value(&deps, model_json()).unwrap();
        let ids: Vec<u64> = archive.versions().iter().map(VersionArchive::id).collect();
        assert_eq!(ids, vec![200, 100]);
    }

    #[tokio::test]
    async fn test_new_model_keeps_existing_metadata() {
        let temp = tempdir().unwrap();
        let backend = backend();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new());

        let meta = temp.path().join("10").join("meta.json");
        std::fs::create_dir_all(meta.parent().unwrap()).unwrap();
        std::fs::write(&meta, "{\"id\": 10}").unwrap();

        ModelArchive::from_value(&deps, model_json())
            .unwrap()
            .new_model()
            .unwrap();
        assert_eq!(std::fs::read_to_string(&meta).unwrap(), "{\"id\": 10}");
    }

    #[tokio::test]
    async fn test_refresh_metadata_rewrites_file() {
        let temp = tempdir().unwrap();
        let backend = backend();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new().with_refresh_metadata(true));

        let meta = temp.path().join("10").join("meta.json");
        std::fs::create_dir_all(meta.parent().unwrap()).unwrap();
        std::fs::write(&meta, "{\"id\": 10}").unwrap();

        ModelArchive::from_value(&deps, model_json())
            .unwrap()
            .new_model()
            .unwrap();
        let stored: Value = serde_json::from_str(&std::fs::read_to_string(&meta).unwrap()).unwrap();
        assert_eq!(stored["modelVersions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_replayed_model_does_not_write_metadata() {
        let temp = tempdir().unwrap();
        let backend = backend();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new());

        let archive = ModelArchive::from_value(&deps, model_json()).unwrap().replayed();
        archive.new_model().unwrap();

        assert!(temp.path().join("10").is_dir());
        assert!(!temp.path().join("10").join("meta.json").exists());
    }

    #[tokio::test]
    async fn test_metadata_only_downloads_nothing() {
        let temp = tempdir().unwrap();
        let backend = backend();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new().with_metadata_only(true));

        let archive = ModelArchive::from_value(&deps, model_json()).unwrap();
        archive.new_model().unwrap();
        let report = archive.run(false).await.unwrap();

        assert_eq!(report, ArchiveReport::default());
        assert_eq!(backend.request_count(), 0);
        assert!(!temp.path().join("10").join("200").exists());
    }

    #[tokio::test]
    async fn test_latest_only_downloads_newest_version() {
        let temp = tempdir().unwrap();
        let backend = backend();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new().with_latest_only(true));

        let archive = ModelArchive::from_value(&deps, model_json()).unwrap();
        archive.new_model().unwrap();
        let report = archive.run(false).await.unwrap();

        assert_eq!(report.assets.downloaded, 1);
        assert!(temp.path().join("10").join("200").is_dir());
        assert!(!temp.path().join("10").join("100").exists());
    }

    #[tokio::test]
    async fn test_run_with_verify_checks_each_version() {
        let temp = tempdir().unwrap();
        let backend = backend();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new());

        let archive = ModelArchive::from_value(&deps, model_json()).unwrap();
        archive.new_model().unwrap();
        let report = archive.run(true).await.unwrap();

        assert_eq!(report.assets.downloaded, 2);
        assert_eq!(report.verification.present, 2);
        assert_eq!(report.verification.problems(), 0);
    }

    #[tokio::test]
    async fn test_verify_prunes_superseded_versions_on_disk() {
        let temp = tempdir().unwrap();
        let backend = backend();

        let full = deps(temp.path(), &backend, ArchiveOptions::new());
        let archive = ModelArchive::from_value(&full, model_json()).unwrap();
        archive.new_model().unwrap();
        archive.run(false).await.unwrap();
        assert!(temp.path().join("10").join("100").is_dir());

        let latest = deps(temp.path(), &backend, ArchiveOptions::new().with_latest_only(true));
        let report = ModelArchive::from_value(&latest, model_json())
            .unwrap()
            .verify()
            .await
            .unwrap();

        assert_eq!(report.pruned, 1);
        assert!(!temp.path().join("10").join("100").exists());
        assert!(temp.path().join("10").join("200").is_dir());
        assert_eq!(report.verification.present, 1);
    }

    #[tokio::test]
    async fn test_version_with_no_assets_is_a_no_op() {
        let temp = tempdir().unwrap();
        let backend = FakeBackend::new();
        let deps = deps(temp.path(), &backend, ArchiveOptions::new());

        let raw = json!({
            "id": 11,
            "nsfw": false,
            "modelVersions": [{"id": 111, "createdAt": "2024-01-01T00:00:00.000Z", "files": [], "images": []}]
        });
        let archive = ModelArchive::from_value(&deps, raw).unwrap();
        archive.new_model().unwrap();

        assert_eq!(archive.run(true).await.unwrap(), ArchiveReport::default());
        assert_eq!(archive.verify().await.unwrap(), ArchiveReport::default());
        assert!(temp.path().join("11").join("111").is_dir());
    }
}
