//! Embedding provider trait and the default Ollama-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use heritage_types::EmbeddingSettings;

use crate::error::EmbeddingError;
use crate::fallback::{fallback_vector, DEFAULT_DIMENSION};
use crate::ollama::OllamaClient;

/// Trait for embedding providers.
///
/// Implementations must be thread-safe (Send + Sync) since the sleep
/// daemon calls them from spawned tasks.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text` with `model`. `None` or an empty model name selects
    /// the deterministic fallback vector.
    async fn embed(&self, model: Option<&str>, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Deterministic fallback vector for `text`.
    fn fallback(&self, text: &str) -> Vec<f32> {
        fallback_vector(text, DEFAULT_DIMENSION)
    }
}

/// Ollama client plus hash fallback.
///
/// With `fallback_on_error` set (the default) provider failures are
/// logged and answered with the fallback vector, so `embed` never fails.
/// Without it, the failure is returned and callers can stage the pair.
#[derive(Debug, Clone)]
pub struct HeritageEmbedder {
    client: Option<OllamaClient>,
    dimension: usize,
    fallback_on_error: bool,
}

impl HeritageEmbedder {
    pub fn new(client: OllamaClient, dimension: usize) -> Self {
        Self {
            client: Some(client),
            dimension,
            fallback_on_error: true,
        }
    }

    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self, EmbeddingError> {
        let client = OllamaClient::new(
            settings.base_url.clone(),
            Duration::from_secs(settings.timeout_secs),
        )?;
        Ok(Self {
            client: Some(client),
            dimension: settings.dimension,
            fallback_on_error: settings.fallback_on_error,
        })
    }

    /// Embedder that never leaves the process
    pub fn fallback_only(dimension: usize) -> Self {
        Self {
            client: None,
            dimension,
            fallback_on_error: true,
        }
    }

    pub fn with_fallback_on_error(mut self, fallback_on_error: bool) -> Self {
        self.fallback_on_error = fallback_on_error;
        self
    }

    /// Length of fallback vectors
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl Embedder for HeritageEmbedder {
    async fn embed(&self, model: Option<&str>, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let model = match model.filter(|m| !m.is_empty()) {
            Some(model) => model,
            None => return Ok(self.fallback(text)),
        };

        let result = match &self.client {
            Some(client) => client.embeddings(model, text).await,
            None => Err(EmbeddingError::Config(
                "no embedding endpoint configured".to_string(),
            )),
        };

        match result {
            Ok(vector) => Ok(vector),
            Err(e) if self.fallback_on_error => {
                warn!(model = %model, error = %e, "Embedding provider unavailable, using fallback vector");
                Ok(self.fallback(text))
            }
            Err(e) => {
                debug!(model = %model, error = %e, "Embedding provider unavailable");
                Err(e)
            }
        }
    }

    fn fallback(&self, text: &str) -> Vec<f32> {
        fallback_vector(text, self.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ollama::DEFAULT_TIMEOUT;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_no_model_uses_fallback() {
        let embedder = HeritageEmbedder::fallback_only(DEFAULT_DIMENSION);
        let a = embedder.embed(None, "salt and static").await.unwrap();
        let b = embedder.embed(Some(""), "salt and static").await.unwrap();
        assert_eq!(a.len(), DEFAULT_DIMENSION);
        assert_eq!(a, b);
        assert_eq!(a, fallback_vector("salt and static", DEFAULT_DIMENSION));
    }

    #[tokio::test]
    async fn test_model_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"embedding": [1.0, 0.0, 0.5]})),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), DEFAULT_TIMEOUT).unwrap();
        let embedder = HeritageEmbedder::new(client, DEFAULT_DIMENSION);
        let vector = embedder.embed(Some("m"), "paper tide").await.unwrap();
        assert_eq!(vector, vec![1.0, 0.0, 0.5]);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": "x"})))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), DEFAULT_TIMEOUT).unwrap();
        let embedder = HeritageEmbedder::new(client, 16);
        let vector = embedder.embed(Some("m"), "paper tide").await.unwrap();
        assert_eq!(vector, fallback_vector("paper tide", 16));
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_when_strict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = OllamaClient::new(server.uri(), DEFAULT_TIMEOUT).unwrap();
        let embedder = HeritageEmbedder::new(client, 16).with_fallback_on_error(false);
        let err = embedder.embed(Some("m"), "paper tide").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Status { status: 500, .. }));

        // No model still never touches the network
        assert!(embedder.embed(None, "paper tide").await.is_ok());
    }

    #[test]
    fn test_from_settings() {
        let settings = EmbeddingSettings {
            dimension: 32,
            fallback_on_error: false,
            ..Default::default()
        };
        let embedder = HeritageEmbedder::from_settings(&settings).unwrap();
        assert_eq!(embedder.dimension(), 32);
        assert_eq!(embedder.fallback("x").len(), 32);
    }
}
