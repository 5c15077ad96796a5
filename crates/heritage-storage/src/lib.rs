//! Storage layer for the heritage library.
//!
//! Plain-file storage with one JSON document per record:
//! - `heritage/{id}.json` for artifacts
//! - `staging-embeddings/{artifactId}-{model}.json` for staged embedding work
//!
//! Directories are created on first write. Read paths treat a missing
//! directory as empty, and a single unreadable file is skipped with a
//! warning instead of failing the whole listing.

pub mod error;
mod fs_util;
pub mod staging;
pub mod store;

pub use error::StorageError;
pub use staging::{StagingQueue, STAGING_DIR_NAME};
pub use store::{ArtifactQuery, ArtifactStore, HERITAGE_DIR_NAME};
