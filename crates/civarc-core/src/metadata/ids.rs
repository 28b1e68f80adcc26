//! Id files: one numeric id or item URL per line.

use std::fs;
use std::path::Path;

use tracing::warn;

use super::error::{MetadataError, MetadataResult};

/// Extract an item id from one line of an id file.
///
/// A bare number is taken as is. Otherwise the line is treated as a URL or
/// path: of its last two segments (in order) the first fully numeric one
/// wins, so both `.../models/123/some-name` and `.../images/456` resolve.
pub fn parse_id_line(line: &str) -> Option<u64> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Ok(id) = line.parse::<u64>() {
        return Some(id);
    }

    let path = line.split(['?', '#']).next().unwrap_or(line);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let tail = &segments[segments.len().saturating_sub(2)..];

    tail.iter()
        .find(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
}

/// Read every id from `path`, skipping (and logging) lines without one.
pub fn load_ids_from_file(path: &Path) -> MetadataResult<Vec<u64>> {
    let content = fs::read_to_string(path).map_err(|e| MetadataError::io(path, e))?;

    let mut ids = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_id_line(line) {
            Some(id) => ids.push(id),
            None => warn!(
                file = %path.display(),
                line = index + 1,
                content = line.trim(),
                "Skipping line without an item id"
            ),
        }
    }
    Ok(ids)
}
