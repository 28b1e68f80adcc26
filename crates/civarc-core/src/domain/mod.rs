//! Records parsed from the remote listing endpoints.
//!
//! Records are immutable views built once from a JSON item. Ordering and
//! derived values are computed at construction so the orchestration layer
//! never mutates them.

mod image;
mod listing;
mod model;

pub use image::ImageRecord;
pub use listing::{ListingPage, PageMetadata};
pub use model::{FileRef, ImageRef, ModelRecord, VersionRecord};
