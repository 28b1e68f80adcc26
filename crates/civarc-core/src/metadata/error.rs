//! Metadata error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors raised while parsing, reading or writing item metadata.
///
/// All variants are scoped to a single item: callers log and move on.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The JSON was readable but does not have the expected shape.
    #[error("Malformed metadata for {context}: {message}")]
    Malformed {
        /// Which item (or file) was being parsed
        context: String,
        /// What was wrong with it
        message: String,
    },

    /// Reading or writing a metadata file failed.
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A metadata file does not contain valid JSON.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MetadataError {
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
