//! Embedding error types.

use thiserror::Error;

/// Errors that can occur while computing embeddings.
///
/// Every variant describes the external provider being unavailable in
/// some way; callers recover with a fallback vector or by staging.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Network or transport failure
    #[error("Embedding request failed: {0}")]
    Request(String),

    /// Provider did not answer within the configured timeout
    #[error("Timeout waiting for embedding response")]
    Timeout,

    /// Non-success HTTP status
    #[error("Embedding endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response carried no usable vector
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),

    /// Client could not be built
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmbeddingError::Timeout
        } else if err.is_decode() {
            EmbeddingError::InvalidResponse(err.to_string())
        } else {
            EmbeddingError::Request(err.to_string())
        }
    }
}
