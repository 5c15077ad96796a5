//! # heritage-types
//!
//! Shared domain types for the artifact heritage library.
//!
//! This crate defines the data structures passed between the store,
//! the embedding pipeline and search:
//! - Artifacts: persisted creative units with tags and embeddings
//! - Staging entries: deferred (artifact, model) embedding work
//! - Settings: layered configuration

pub mod artifact;
pub mod config;
pub mod error;
pub mod staging;

pub use artifact::{
    Artifact, ArtifactContent, ContentKind, EMBEDDINGS_KEY, EMBEDDING_KEY, EMBEDDING_MODELS_KEY,
    EMBEDDING_MODEL_KEY, FALLBACK_MODEL_ID,
};
pub use config::{DaemonSettings, EmbeddingSettings, GeneratorSettings, OverlapMode, Settings};
pub use error::HeritageError;
pub use staging::StagingEntry;
