//! Reading and writing metadata files for one archive root.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, warn};

use super::error::{MetadataError, MetadataResult};
use crate::domain::ListingPage;

/// Filename of a model's metadata inside its directory.
pub const MODEL_METADATA_FILE: &str = "meta.json";

/// Where metadata files live relative to the archive root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataLayout {
    /// `<root>/<id>/meta.json`, used for models.
    ModelDirectories,
    /// `<root>/<id>.json`, used for standalone images.
    FlatFiles,
}

/// What `persist` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Written,
    /// A metadata file was already present and was left untouched.
    Kept,
}

/// Metadata side files of one archive root.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    root: PathBuf,
    layout: MetadataLayout,
}

impl MetadataStore {
    pub fn new(root: impl Into<PathBuf>, layout: MetadataLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn layout(&self) -> MetadataLayout {
        self.layout
    }

    /// Metadata file path of item `id`.
    pub fn path_for(&self, id: u64) -> PathBuf {
        match self.layout {
            MetadataLayout::ModelDirectories => {
                self.root.join(id.to_string()).join(MODEL_METADATA_FILE)
            }
            MetadataLayout::FlatFiles => self.root.join(format!("{id}.json")),
        }
    }

    /// Write `value` as the metadata of item `id`.
    ///
    /// An existing file is authoritative and kept as is unless `overwrite`
    /// is set. The parent directory must already exist.
    ///
    /// The JSON goes to `<file>.tmp` first and is renamed into place, so an
    /// interrupted write never leaves a truncated metadata file behind.
    pub fn persist(&self, id: u64, value: &Value, overwrite: bool) -> MetadataResult<PersistOutcome> {
        let path = self.path_for(id);
        if path.exists() && !overwrite {
            debug!(path = %path.display(), "Metadata already present, keeping it");
            return Ok(PersistOutcome::Kept);
        }

        let bytes = to_pretty_json(value).map_err(|source| MetadataError::Json {
            path: path.clone(),
            source,
        })?;
        let temp_path = temp_path_for(&path);
        fs::write(&temp_path, bytes).map_err(|e| MetadataError::io(&temp_path, e))?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(MetadataError::io(&path, e));
        }
        Ok(PersistOutcome::Written)
    }

    /// Read the metadata of item `id`.
    pub fn read(&self, id: u64) -> MetadataResult<Value> {
        read_json(&self.path_for(id))
    }

    /// Collect every readable metadata file below the root into one terminal
    /// listing page. Unreadable entries are logged and skipped.
    pub fn load_all(&self) -> ListingPage {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "Cannot read archive root");
                return ListingPage::single(Vec::new());
            }
        };

        let mut candidates: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter_map(|path| match self.layout {
                MetadataLayout::ModelDirectories => {
                    path.is_dir().then(|| path.join(MODEL_METADATA_FILE))
                }
                MetadataLayout::FlatFiles => (path.is_file()
                    && path.extension().is_some_and(|ext| ext == "json"))
                .then_some(path),
            })
            .collect();
        candidates.sort();

        let items = candidates
            .iter()
            .filter_map(|path| match read_json(path) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable metadata");
                    None
                }
            })
            .collect();

        ListingPage::single(items)
    }
}

/// Serialize with four-space indentation.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn to_pretty_json(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    Ok(buf)
}

fn read_json(path: &Path) -> MetadataResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| MetadataError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| MetadataError::Json {
        path: path.to_path_buf(),
        source,
    })
}
