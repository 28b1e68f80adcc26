//! Filesystem helpers for the archive layout.
//!
//! - `ensure`: idempotent directory creation, root checks and pruning
//! - `exists`: the existence check that gates every download

mod ensure;
mod error;
mod exists;

pub use ensure::{ensure_directory, ensure_root, remove_directory, verify_writable};
pub use error::PathError;
pub use exists::{exists, find_matches, strip_last_extension};
