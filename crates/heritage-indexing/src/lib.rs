//! Indexing for the artifact heritage library.
//!
//! ## Key Components
//!
//! - [`ModelSelection`]: which embedding models an index pass targets
//! - [`Indexer`]: computes missing embeddings over the artifact store and
//!   stages pairs whose embedding could not be computed
//! - [`StagingProcessor`]: drains the staging queue, one attempt per entry
//! - [`IndexReport`]: per-pass summary (ids updated, staged, skipped)
//!
//! ## Modes
//!
//! With no model, every artifact lacking the legacy `metadata.embedding`
//! gets a fallback vector tagged `fallback-hash`. With one or more models,
//! every artifact is embedded once per model into `metadata.embeddings`,
//! overwriting earlier vectors for the same model.

pub mod error;
pub mod indexer;
pub mod processor;
pub mod report;
pub mod selection;

pub use error::IndexingError;
pub use indexer::Indexer;
pub use processor::{ProcessOptions, ProcessedEntry, StagingProcessor};
pub use report::IndexReport;
pub use selection::ModelSelection;
