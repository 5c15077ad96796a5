//! # heritage-embeddings
//!
//! Turns artifact text into fixed-length vectors.
//!
//! Two sources are combined behind the [`Embedder`] trait:
//! - an Ollama-compatible `/api/embeddings` endpoint, called with a bounded
//!   timeout and treated as possibly unavailable
//! - a deterministic hash-seeded generator used when no model is requested
//!   or the model cannot be reached
//!
//! [`cosine`] compares vectors of possibly different lengths by truncating
//! both to the shorter one.

pub mod error;
pub mod fallback;
pub mod ollama;
pub mod provider;
pub mod similarity;

pub use error::EmbeddingError;
pub use fallback::{fallback_vector, DEFAULT_DIMENSION};
pub use ollama::{OllamaClient, DEFAULT_TIMEOUT};
pub use provider::{Embedder, HeritageEmbedder};
pub use similarity::cosine;
