//! One model version: `<root>/<modelId>/<versionId>/`.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use civarc_api::HttpBackend;
use civarc_core::{
    FileHealth, VersionRecord, check_file, ensure_directory, exists, file_target_name,
    find_matches, image_target_stem, remove_directory, version_dir,
};

use super::{ArchiveDeps, image_source_url};
use crate::error::DownloadResult;
use crate::summary::{AssetTally, VerifyTally};

pub struct VersionArchive<'a, B: HttpBackend> {
    deps: &'a ArchiveDeps<B>,
    model_id: u64,
    version: VersionRecord,
    dir: PathBuf,
}

impl<'a, B: HttpBackend> VersionArchive<'a, B> {
    pub fn new(deps: &'a ArchiveDeps<B>, model_id: u64, version: VersionRecord) -> Self {
        let dir = version_dir(&deps.root, model_id, version.id);
        Self {
            deps,
            model_id,
            version,
            dir,
        }
    }

    pub const fn id(&self) -> u64 {
        self.version.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the version directory.
    pub fn prepare(&self) -> DownloadResult<()> {
        ensure_directory(&self.dir)?;
        Ok(())
    }

    /// Download every file and image not already on disk.
    pub async fn run(&self) -> AssetTally {
        let mut tally = AssetTally::default();
        let ignorable = self.deps.ignorable_status_codes.as_slice();

        for file in &self.version.files {
            let name = file_target_name(self.model_id, self.version.id, file);
            if exists(&self.dir, &name, false) {
                debug!(model_id = self.model_id, version_id = self.version.id, file = %name, "Already downloaded");
                tally.already_present += 1;
                continue;
            }

            let target = self.dir.join(&name);
            info!(
                model_id = self.model_id,
                version_id = self.version.id,
                path = %target.display(),
                "Downloading model file"
            );
            let outcome = self
                .deps
                .downloader
                .download(&file.download_url, &target, false, ignorable)
                .await;
            tally.record(&outcome);
        }

        let total = self.version.images.len();
        for (index, image) in self.version.images.iter().enumerate() {
            let stem = image_target_stem(image);
            if exists(&self.dir, &stem, true) {
                tally.already_present += 1;
                continue;
            }

            let target = self.dir.join(&stem);
            info!(
                model_id = self.model_id,
                version_id = self.version.id,
                path = %target.display(),
                "Downloading image [{}/{total}]",
                index + 1
            );
            let url = image_source_url(image, self.deps.options.original_image);
            let outcome = self
                .deps
                .downloader
                .download(&url, &target, true, ignorable)
                .await;
            tally.record(&outcome);
        }

        tally
    }

    /// Check presence of every asset and the declared hash of every file.
    ///
    /// Problems are logged, never repaired.
    pub async fn verify(&self) -> VerifyTally {
        let mut tally = VerifyTally::default();

        for file in &self.version.files {
            let name = file_target_name(self.model_id, self.version.id, file);
            info!(model_id = self.model_id, version_id = self.version.id, file = %name, "Verifying model file");

            let health = match find_matches(&self.dir, &name, false).first() {
                Some(path) => check_file(path, file.sha256.as_deref()).await,
                None => FileHealth::Missing,
            };
            match &health {
                FileHealth::Missing => {
                    error!(model_id = self.model_id, version_id = self.version.id, file = %name, "Model file does not exist");
                }
                FileHealth::Corrupt { expected, actual } => {
                    error!(
                        model_id = self.model_id,
                        version_id = self.version.id,
                        file = %name,
                        expected = %expected,
                        actual = %actual,
                        "Model file hash does not match"
                    );
                }
                FileHealth::Present => {
                    info!(model_id = self.model_id, version_id = self.version.id, file = %name, "No declared hash, skipped hash verification");
                }
                FileHealth::Verified => {}
            }
            tally.record(&health);
        }

        for image in &self.version.images {
            let stem = image_target_stem(image);
            let health = if exists(&self.dir, &stem, true) {
                FileHealth::Present
            } else {
                error!(model_id = self.model_id, version_id = self.version.id, image = %stem, "Image does not exist");
                FileHealth::Missing
            };
            tally.record(&health);
        }

        tally
    }

    /// Delete the version directory and everything in it.
    pub fn remove(&self) -> DownloadResult<bool> {
        let removed = remove_directory(&self.dir)?;
        if removed {
            info!(model_id = self.model_id, version_id = self.version.id, path = %self.dir.display(), "Removed version directory");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use civarc_api::testing::{CannedResponse, FakeBackend};
    use civarc_core::ModelRecord;
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::archive::test_support::deps;
    use crate::options::ArchiveOptions;

    // sha256("abc")
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn version() -> VersionRecord {
        let model = ModelRecord::from_value(json!({
            "id": 3,
            "modelVersions": [{
                "id": 300,
                "createdAt": "2024-03-01T00:00:00.000Z",
                "files": [{
                    "name": "weights.safetensors",
                    "downloadUrl": "https://civitai.com/api/download/models/300",
                    "hashes": {"SHA256": ABC_SHA256.to_uppercase()}
                }],
                "images": [{"url": "https://image.civitai.com/x/width=450/7.jpeg", "hash": "img-hash"}]
            }]
        }))
        .unwrap();
        model.versions.into_iter().next().unwrap()
    }

    fn backend() -> FakeBackend {
        FakeBackend::new()
            .with_response("models/300", CannedResponse::body("application/octet-stream", b"abc"))
            .with_response("7.jpeg", CannedResponse::body("image/jpeg", b"jpeg"))
    }

    #[tokio::test]
    async fn test_run_downloads_missing_assets_once() {
        let temp = tempdir().unwrap();
        let backend = backend();
        let deps = deps(temp.path(), &backend, ArchiveOptions::default());
        let archive = VersionArchive::new(&deps, 3, version());
        archive.prepare().unwrap();

        let first = archive.run().await;
        assert_eq!(first.downloaded, 2);
        assert!(archive.dir().join(format!("{ABC_SHA256}.safetensors")).is_file());

        let second = archive.run().await;
        assert_eq!(second.downloaded, 0);
        assert_eq!(second.already_present, 2);
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test]
    async fn test_verify_reports_corrupt_and_missing_assets() {
        let temp = tempdir().unwrap();
        let backend = backend();
        let deps = deps(temp.path(), &backend, ArchiveOptions::default());
        let archive = VersionArchive::new(&deps, 3, version());
        archive.prepare().unwrap();
        archive.run().await;

        let healthy = archive.verify().await;
        assert_eq!(healthy.verified, 1);
        assert_eq!(healthy.present, 1);
        assert_eq!(healthy.problems(), 0);

        std::fs::write(archive.dir().join(format!("{ABC_SHA256}.safetensors")), b"abd").unwrap();
        for path in find_matches(archive.dir(), &image_target_stem(&version().images[0]), true) {
            std::fs::remove_file(path).unwrap();
        }

        let damaged = archive.verify().await;
        assert_eq!(damaged.corrupt, 1);
        assert_eq!(damaged.missing, 1);
        assert_eq!(backend.request_count(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp = tempdir().unwrap();
        let backend = backend();
        let deps = deps(temp.path(), &backend, ArchiveOptions::default());
        let archive = VersionArchive::new(&deps, 3, version());

        archive.prepare().unwrap();
        assert!(archive.dir().is_dir());
        assert!(archive.remove().unwrap());
        assert!(!archive.dir().exists());
        assert!(!archive.remove().unwrap());
    }
}
