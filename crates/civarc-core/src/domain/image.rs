//! Standalone image records from the image listing endpoint.

use serde::Deserialize;
use serde_json::Value;

use super::model::{ImageRef, describe};
use crate::metadata::{MetadataError, MetadataResult};

/// An image listing item archived as `<root>/<id>.json` + `<root>/<id>.<ext>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub id: u64,
    pub nsfw: bool,
    pub image: ImageRef,
    raw: Value,
}

/// The image API reports NSFW either as a boolean or as a level name.
#[derive(Deserialize)]
#[serde(untagged)]
enum NsfwFlag {
    Flag(bool),
    Level(String),
}

impl NsfwFlag {
    fn is_nsfw(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Level(level) => !level.eq_ignore_ascii_case("none"),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageDoc {
    id: u64,
    url: String,
    hash: String,
    #[serde(default)]
    width: Option<u64>,
    #[serde(default)]
    nsfw: Option<NsfwFlag>,
    #[serde(default)]
    nsfw_level: Option<NsfwFlag>,
}

impl ImageRecord {
    pub fn from_value(raw: Value) -> MetadataResult<Self> {
        let doc = ImageDoc::deserialize(&raw)
            .map_err(|e| MetadataError::malformed(describe(&raw), e.to_string()))?;

        let nsfw = [doc.nsfw.as_ref(), doc.nsfw_level.as_ref()]
            .into_iter()
            .flatten()
            .any(NsfwFlag::is_nsfw);

        Ok(Self {
            id: doc.id,
            nsfw,
            image: ImageRef {
                url: doc.url,
                hash: doc.hash,
                width: doc.width,
            },
            raw,
        })
    }

    pub const fn raw(&self) -> &Value {
        &self.raw
    }
}
