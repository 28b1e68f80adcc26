//! Metadata side files.
//!
//! Persists listing items as pretty-printed JSON next to their assets and
//! reads them back for offline replay and verification. Also parses the id
//! files used to archive an explicit list of items.

mod error;
mod ids;
mod store;

pub use error::{MetadataError, MetadataResult};
pub use ids::{load_ids_from_file, parse_id_line};
pub use store::{MODEL_METADATA_FILE, MetadataLayout, MetadataStore, PersistOutcome};
