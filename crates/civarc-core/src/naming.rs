//! Deterministic naming of archived assets.
//!
//! Every path here is derived only from ids and declared hashes, never from
//! URLs or wall-clock state, so repeated runs resolve to the same files.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use md5::{Digest, Md5};
use regex::Regex;

use crate::domain::{FileRef, ImageRef};

static WIDTH_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/width=\d+/").expect("width pattern is valid"));

fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

/// Extension taken from the last dot-segment of a filename.
///
/// A name without a dot yields the whole name.
fn last_dot_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// `<root>/<modelId>`
pub fn model_dir(root: &Path, model_id: u64) -> PathBuf {
    root.join(model_id.to_string())
}

/// `<root>/<modelId>/<versionId>`
pub fn version_dir(root: &Path, model_id: u64, version_id: u64) -> PathBuf {
    model_dir(root, model_id).join(version_id.to_string())
}

/// Target filename of a model file.
///
/// The stem is the lowercased declared SHA256, or without one the md5 of
/// `modelId ++ versionId ++ name`. The extension is the last dot-segment of
/// the original name.
pub fn file_target_name(model_id: u64, version_id: u64, file: &FileRef) -> String {
    let stem = file.sha256.as_deref().map_or_else(
        || md5_hex(&format!("{model_id}{version_id}{}", file.name)),
        str::to_lowercase,
    );
    format!("{stem}.{}", last_dot_segment(&file.name))
}

/// Full target path of a model file inside its version directory.
pub fn file_target_path(root: &Path, model_id: u64, version_id: u64, file: &FileRef) -> PathBuf {
    version_dir(root, model_id, version_id).join(file_target_name(model_id, version_id, file))
}

/// Extensionless stem of an image: md5 of its declared identity hash.
pub fn image_target_stem(image: &ImageRef) -> String {
    md5_hex(&image.hash)
}

/// Swap the first `/width=<digits>/` segment for the image's true width.
///
/// URLs without such a segment come back unchanged.
pub fn resolve_original_url(url: &str, width: u64) -> String {
    WIDTH_SEGMENT
        .replace(url, format!("/width={width}/").as_str())
        .into_owned()
}
