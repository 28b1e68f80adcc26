//! Existence checks used as the idempotency gate before downloads.
//!
//! Comparison is by basename anywhere below the directory. With
//! `ignore_extension`, the entry's basename is cut at its *last* dot before
//! comparing, so `<stem>.jpg` matches target `<stem>`.

use std::fs;
use std::path::{Path, PathBuf};

/// Basename with its last `.`-delimited suffix removed.
pub fn strip_last_extension(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

/// All files below `dir` whose basename matches `target`.
///
/// `target` may be a bare filename or a path; only its final component is
/// compared. A missing or unreadable `dir` yields no matches.
pub fn find_matches(dir: &Path, target: &str, ignore_extension: bool) -> Vec<PathBuf> {
    let wanted = Path::new(target)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(target);

    let mut matches = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let Ok(entries) = fs::read_dir(&current) else {
            continue;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let candidate = if ignore_extension {
                strip_last_extension(name)
            } else {
                name
            };
            if candidate == wanted {
                matches.push(path);
            }
        }
    }

    matches.sort();
    matches
}

/// Whether a file named `target` already exists anywhere below `dir`.
pub fn exists(dir: &Path, target: &str, ignore_extension: bool) -> bool {
    !find_matches(dir, target, ignore_extension).is_empty()
}
