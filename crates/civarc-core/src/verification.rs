//! Integrity checks for archived files.
//!
//! Presence is always required; when a SHA256 is declared the file is
//! re-hashed and compared case-insensitively. Mismatches are reported, never
//! repaired here.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Read size used while hashing.
pub const HASH_CHUNK_SIZE: usize = 8 * 1024;

/// Health of one archived file after verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileHealth {
    /// Present and the hash matches the declared one.
    Verified,
    /// Present, but no hash was declared to check against.
    Present,
    /// Present, but the hash differs from the declared one.
    Corrupt {
        /// Declared SHA256 (lowercased).
        expected: String,
        /// SHA256 of the bytes on disk.
        actual: String,
    },
    /// Not on disk.
    Missing,
}

impl FileHealth {
    /// Present and not known to be corrupt.
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Verified | Self::Present)
    }
}

/// SHA256 of everything `reader` yields, as lowercase hex.
pub fn sha256_hex<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// SHA256 of a file, computed on the blocking pool.
pub async fn hash_file(path: &Path) -> io::Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || sha256_hex(File::open(&path)?))
        .await
        .map_err(io::Error::other)?
}

/// Check one file against an optional declared SHA256.
///
/// Read failures on an existing file are reported as `Missing`.
pub async fn check_file(path: &Path, expected_sha256: Option<&str>) -> FileHealth {
    if !path.is_file() {
        return FileHealth::Missing;
    }
    let Some(expected) = expected_sha256 else {
        return FileHealth::Present;
    };

    match hash_file(path).await {
        Ok(actual) if actual.eq_ignore_ascii_case(expected) => FileHealth::Verified,
        Ok(actual) => FileHealth::Corrupt {
            expected: expected.to_lowercase(),
            actual,
        },
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to compute hash");
            FileHealth::Missing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // sha256("hello world")
    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_sha256_of_reader() {
        assert_eq!(sha256_hex(&b"hello world"[..]).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn test_sha256_spans_many_chunks() {
        let data = vec![7u8; HASH_CHUNK_SIZE * 3 + 17];
        let expected = format!("{:x}", Sha256::digest(&data));
        assert_eq!(sha256_hex(&data[..]).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_check_file_matches_case_insensitively() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("f.bin");
        std::fs::write(&path, b"hello world").unwrap();

        let health = check_file(&path, Some(&HELLO_SHA256.to_uppercase())).await;
        assert_eq!(health, FileHealth::Verified);
    }

    #[tokio::test]
    async fn test_check_file_reports_mismatch() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("f.bin");
        std::fs::write(&path, b"hello").unwrap();

        let health = check_file(&path, Some(HELLO_SHA256)).await;
        assert!(matches!(health, FileHealth::Corrupt { ref expected, .. } if expected == HELLO_SHA256));
        assert!(!health.is_ok());
    }

    #[tokio::test]
    async fn test_check_file_without_hash_requires_presence_only() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("f.bin");

        assert_eq!(check_file(&path, None).await, FileHealth::Missing);
        std::fs::write(&path, b"anything").unwrap();
        assert_eq!(check_file(&path, None).await, FileHealth::Present);
    }
}
