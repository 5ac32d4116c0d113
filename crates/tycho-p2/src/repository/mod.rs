//! Metadata repositories the target platform reads units from.

mod metadata;

pub use metadata::{MetadataRepository, CONTENT_FILE};
