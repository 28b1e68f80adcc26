//! Directory creation and removal utilities.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::error::PathError;

/// Create `path` (and parents) if missing. Existing directories are fine.
pub fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Prepare the archive root: create it and make sure we can write into it.
///
/// Failure here is the one local condition that ends a run.
pub fn ensure_root(path: &Path) -> Result<(), PathError> {
    ensure_directory(path)?;
    verify_writable(path)
}

/// Verify a directory is writable by attempting to create a test file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let test_file = path.join(".civarc_write_test");
    let result = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&test_file);

    match result {
        Ok(mut file) => {
            file.write_all(b"test")
                .map_err(|e| PathError::NotWritable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            drop(file);
            let _ = fs::remove_file(&test_file);
            Ok(())
        }
        Err(err) => Err(PathError::NotWritable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

/// Recursively delete a directory tree. Missing directories are a no-op.
///
/// Returns whether anything was removed.
pub fn remove_directory(path: &Path) -> Result<bool, PathError> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path).map_err(|e| PathError::RemoveFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(true)
}
