//! Per-item orchestration.
//!
//! An archive is a short-lived view over one listing record. Its phases are
//! called in order by the pipeline: create the item's place on disk and its
//! metadata, download what is missing, then verify.

mod image;
mod model;
mod version;

use std::path::PathBuf;

use civarc_api::HttpBackend;
use civarc_core::{ImageRef, resolve_original_url};

use crate::downloader::AssetDownloader;
use crate::options::ArchiveOptions;

pub use image::ImageArchive;
pub use model::ModelArchive;
pub use version::VersionArchive;

/// Everything an archive needs besides its record.
pub struct ArchiveDeps<B: HttpBackend> {
    /// Archive root directory.
    pub root: PathBuf,
    pub downloader: AssetDownloader<B>,
    pub options: ArchiveOptions,
    /// Asset statuses treated as "permanently unavailable".
    pub ignorable_status_codes: Vec<u16>,
}

/// URL to fetch an image from, at full resolution when asked and known.
fn image_source_url(image: &ImageRef, original: bool) -> String {
    match image.width {
        Some(width) if original => resolve_original_url(&image.url, width),
        _ => image.url.clone(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: Option<u64>) -> ImageRef {
        ImageRef {
            url: "https://image.civitai.com/x/abc/width=450/1.jpeg".to_string(),
            hash: "abcd".to_string(),
            width,
        }
    }

    #[test]
    fn test_image_source_url_prefers_original_when_asked() {
        assert_eq!(
            image_source_url(&image(Some(1024)), true),
            "https://image.civitai.com/x/abc/width=1024/1.jpeg"
        );
        assert_eq!(
            image_source_url(&image(Some(1024)), false),
            "https://image.civitai.com/x/abc/width=450/1.jpeg"
        );
        assert_eq!(
            image_source_url(&image(None), true),
            "https://image.civitai.com/x/abc/width=450/1.jpeg"
        );
    }
}
