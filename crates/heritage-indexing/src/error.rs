//! Error types for indexing and staged processing.

use heritage_embeddings::EmbeddingError;
use heritage_storage::StorageError;
use thiserror::Error;

/// Errors that abort a whole index or processing pass.
///
/// Per-artifact failures are logged and counted instead.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Storage operation failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Embedding generation error
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}
