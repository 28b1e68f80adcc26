//! Errors that end the processing of an item, or of the whole run when they
//! concern the archive root.

use thiserror::Error;

use civarc_core::{MetadataError, PathError};

pub type DownloadResult<T> = Result<T, DownloadError>;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// A directory could not be created, probed or removed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Metadata could not be parsed, read or written.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}
