//! Model, version, file and image references.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::metadata::{MetadataError, MetadataResult};

/// A downloadable file of a model version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub download_url: String,
    /// Declared SHA256, if the remote record carries one.
    pub sha256: Option<String>,
    /// Original filename. Only its extension and, without a hash, its
    /// contribution to the fallback identity are used.
    pub name: String,
}

/// A preview image attached to a model version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    /// Identity hash declared by the remote record (not the URL).
    pub hash: String,
    pub width: Option<u64>,
}

/// One revision of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub files: Vec<FileRef>,
    pub images: Vec<ImageRef>,
}

/// A model listing item.
///
/// Versions are ordered newest first, so `versions[0]` is the latest one.
/// `raw` is the full item JSON with `modelVersions` in the same order, which
/// is what gets persisted as `meta.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRecord {
    pub id: u64,
    pub nsfw: bool,
    pub versions: Vec<VersionRecord>,
    raw: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelDoc {
    id: u64,
    #[serde(default)]
    nsfw: bool,
    #[serde(default)]
    model_versions: Vec<VersionDoc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionDoc {
    id: u64,
    created_at: String,
    #[serde(default)]
    files: Vec<FileDoc>,
    #[serde(default)]
    images: Vec<ImageDoc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileDoc {
    name: String,
    download_url: String,
    #[serde(default)]
    hashes: HashesDoc,
}

#[derive(Default, Deserialize)]
struct HashesDoc {
    #[serde(rename = "SHA256")]
    sha256: Option<String>,
}

#[derive(Deserialize)]
struct ImageDoc {
    url: String,
    hash: String,
    #[serde(default)]
    width: Option<u64>,
}

impl VersionDoc {
    fn into_record(self, model_id: u64) -> MetadataResult<VersionRecord> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| {
                MetadataError::malformed(
                    format!("model {model_id} version {}", self.id),
                    format!("invalid createdAt '{}': {e}", self.created_at),
                )
            })?
            .with_timezone(&Utc);

        Ok(VersionRecord {
            id: self.id,
            created_at,
            files: self
                .files
                .into_iter()
                .map(|f| FileRef {
                    download_url: f.download_url,
                    sha256: f.hashes.sha256.filter(|h| !h.trim().is_empty()),
                    name: f.name,
                })
                .collect(),
            images: self
                .images
                .into_iter()
                .map(|i| ImageRef {
                    url: i.url,
                    hash: i.hash,
                    width: i.width,
                })
                .collect(),
        })
    }
}

impl ModelRecord {
    /// Parse a model listing item, sorting its versions newest first.
    pub fn from_value(mut raw: Value) -> MetadataResult<Self> {
        let doc = ModelDoc::deserialize(&raw)
            .map_err(|e| MetadataError::malformed(describe(&raw), e.to_string()))?;
        let model_id = doc.id;

        let mut versions = doc
            .model_versions
            .into_iter()
            .enumerate()
            .map(|(index, v)| v.into_record(model_id).map(|record| (index, record)))
            .collect::<MetadataResult<Vec<_>>>()?;

        // Stable sort keeps the remote order for equal timestamps.
        versions.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));

        if let Some(Value::Array(items)) = raw.get_mut("modelVersions") {
            let mut slots: Vec<Option<Value>> = items.drain(..).map(Some).collect();
            *items = versions
                .iter()
                .filter_map(|(index, _)| slots.get_mut(*index).and_then(Option::take))
                .collect();
        }

        Ok(Self {
            id: model_id,
            nsfw: doc.nsfw,
            versions: versions.into_iter().map(|(_, v)| v).collect(),
            raw,
        })
    }

    /// The most recently created version.
    pub fn latest(&self) -> Option<&VersionRecord> {
        self.versions.first()
    }

    /// Full item JSON, with versions in recency order.
    pub const fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Short description of an item for error messages.
pub(crate) fn describe(raw: &Value) -> String {
    raw.get("id")
        .map_or_else(|| "item without id".to_string(), |id| format!("item {id}"))
}
