//! Client for an Ollama-compatible model server.
//!
//! Two endpoints are used:
//! - `POST {base_url}/api/embeddings` with `{model, input}`
//! - `POST {base_url}/api/generate` with `{model, prompt, system, stream: false}`
//!
//! Every request is bounded by the client timeout. There is no retry here;
//! callers fall back or stage instead.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::EmbeddingError;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// HTTP client for embedding and generation requests.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request an embedding for `text` from `model`.
    pub async fn embeddings(&self, model: &str, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        #[derive(Serialize)]
        struct EmbeddingsRequest<'a> {
            model: &'a str,
            input: &'a str,
        }

        let body = self
            .post_json("api/embeddings", &EmbeddingsRequest { model, input: text })
            .await?;

        let vector = extract_embedding(&body)?;
        debug!(model = %model, dimension = vector.len(), "Received embedding");
        Ok(vector)
    }

    /// Generate text with `model`. Returns the `response` string, or the raw
    /// body when the server answers with some other shape.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, EmbeddingError> {
        #[derive(Serialize)]
        struct GenerateRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            system: Option<&'a str>,
            stream: bool,
        }

        let body = self
            .post_json(
                "api/generate",
                &GenerateRequest {
                    model,
                    prompt,
                    system,
                    stream: false,
                },
            )
            .await?;

        Ok(match body.get("response") {
            Some(Value::String(text)) => text.clone(),
            _ => body.to_string(),
        })
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        request: &T,
    ) -> Result<Value, EmbeddingError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Pull the vector out of `data[0].embedding` or `embedding`.
///
/// Elements are coerced to numbers (numeric strings are accepted); an
/// absent, empty or non-numeric array is an invalid response.
pub(crate) fn extract_embedding(body: &Value) -> Result<Vec<f32>, EmbeddingError> {
    let candidate = body
        .pointer("/data/0/embedding")
        .filter(|v| v.is_array())
        .or_else(|| body.get("embedding").filter(|v| v.is_array()))
        .and_then(Value::as_array)
        .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding array".to_string()))?;

    if candidate.is_empty() {
        return Err(EmbeddingError::InvalidResponse(
            "empty embedding array".to_string(),
        ));
    }

    candidate
        .iter()
        .map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .map(|f| f.filter(|f| f.is_finite()).map(|f| f as f32))
        .collect::<Option<Vec<f32>>>()
        .ok_or_else(|| EmbeddingError::InvalidResponse("non-numeric embedding value".to_string()))
}
