//! Downloading and archiving for civarc.
//!
//! - `downloader` - streams one asset to disk under the retry policy
//! - `archive` - per-item orchestration (model, version, image)
//! - `pipeline` - listing sources and the sequential passes over them

mod archive;
mod downloader;
mod error;
mod options;
mod pipeline;
mod summary;

pub use archive::{ArchiveDeps, ImageArchive, ModelArchive, VersionArchive};
pub use downloader::{
    AssetDownloader, DownloadOutcome, detected_extensions, extension_for_content_type,
};
pub use error::{DownloadError, DownloadResult};
pub use options::ArchiveOptions;
pub use pipeline::{ListingSource, PageCursor, Pipeline, layout_for};
pub use summary::{ArchiveReport, AssetTally, ItemOutcome, RunSummary, VerifyTally};
