//! Core domain for civarc.
//!
//! Holds everything that does not talk to the network: the records parsed
//! from listing items, the deterministic naming rules for archived assets,
//! the existence checks that make re-runs idempotent, the metadata side files
//! and the hash verification used by the verify pass.

pub mod domain;
pub mod metadata;
pub mod naming;
pub mod paths;
pub mod redact;
pub mod verification;

// Re-export commonly used types for convenience
pub use domain::{
    FileRef, ImageRecord, ImageRef, ListingPage, ModelRecord, PageMetadata, VersionRecord,
};
pub use metadata::{
    MetadataError, MetadataLayout, MetadataResult, MetadataStore, PersistOutcome,
    load_ids_from_file, parse_id_line,
};
pub use naming::{
    file_target_name, file_target_path, image_target_stem, model_dir, resolve_original_url,
    version_dir,
};
pub use paths::{PathError, ensure_directory, ensure_root, exists, find_matches, remove_directory};
pub use redact::{SECRET_PLACEHOLDER, redact_secrets};
pub use verification::{FileHealth, HASH_CHUNK_SIZE, check_file, hash_file};
