//! Artifact generation.
//!
//! With both a model and a prompt the text comes from the model server's
//! generate endpoint. Otherwise, or when that call fails, a random vignette
//! is assembled from a fixed fragment list.

use rand::Rng;
use serde_json::Value;
use tracing::{debug, warn};

use heritage_embeddings::{EmbeddingError, OllamaClient};
use heritage_types::{Artifact, ArtifactContent};

const FRAGMENTS: [&str; 7] = [
    "a glass city",
    "echoing corridors",
    "a whispered algorithm",
    "salt and static",
    "a paper tide",
    "luminous moss",
    "clockwork clouds",
];

/// Tags applied to every generated artifact
pub const GENERATED_TAGS: [&str; 2] = ["seed", "model-generated"];

/// Random vignette: `VIGNETTE (<seed>): <two fragments>; <fragment>; <fragment>.`
pub fn fallback_vignette<R: Rng>(seed: Option<&str>, rng: &mut R) -> String {
    let mut pick = |n: usize| {
        (0..n)
            .map(|_| FRAGMENTS[rng.random_range(0..FRAGMENTS.len())])
            .collect::<Vec<_>>()
            .join(", ")
    };
    let seed = seed.filter(|s| !s.is_empty()).unwrap_or("ad-hoc");
    let (first, second, third) = (pick(2), pick(1), pick(1));
    format!("VIGNETTE ({seed}): {first}; {second}; {third}.")
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub model: Option<String>,
    pub prompt: Option<String>,
    pub system_prompt: Option<String>,
}

/// Builds seed artifacts, from a model when possible.
pub struct ArtifactGenerator {
    client: OllamaClient,
}

impl ArtifactGenerator {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    /// Generate an artifact. Never fails: model errors degrade to a vignette.
    pub async fn generate(&self, options: &GenerateOptions) -> Artifact {
        let model = options.model.as_deref().filter(|m| !m.is_empty());
        let prompt = options.prompt.as_deref().filter(|p| !p.is_empty());

        let text = match (model, prompt) {
            (Some(model), Some(prompt)) => match self.request_text(model, prompt, options).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(model = %model, error = %e, "Generation failed, using vignette");
                    fallback_vignette(Some(prompt), &mut rand::rng())
                }
            },
            _ => fallback_vignette(prompt, &mut rand::rng()),
        };

        let mut artifact = Artifact::new(Artifact::generate_id(), vec![ArtifactContent::text(text)])
            .with_tags(GENERATED_TAGS.iter().map(|t| t.to_string()).collect())
            .with_provenance(
                options.model.clone(),
                options.prompt.clone(),
                options.system_prompt.clone(),
            );
        artifact
            .metadata
            .insert("seeded".to_string(), Value::Bool(true));
        artifact
    }

    async fn request_text(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, EmbeddingError> {
        let text = self
            .client
            .generate(model, prompt, options.system_prompt.as_deref())
            .await?;
        debug!(model = %model, chars = text.len(), "Generated artifact text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heritage_embeddings::DEFAULT_TIMEOUT;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn assert_vignette(text: &str, seed: &str) {
        let prefix = format!("VIGNETTE ({seed}): ");
        assert!(text.starts_with(&prefix), "{text}");
        assert!(text.ends_with('.'));

        let body = &text[prefix.len()..text.len() - 1];
        let parts: Vec<&str> = body.split("; ").collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].split(", ").count(), 2);
        for fragment in parts.iter().flat_map(|p| p.split(", ")) {
            assert!(FRAGMENTS.contains(&fragment), "unknown fragment {fragment}");
        }
    }

    #[test]
    fn test_vignette_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_vignette(&fallback_vignette(None, &mut rng), "ad-hoc");
        assert_vignette(&fallback_vignette(Some(""), &mut rng), "ad-hoc");
        assert_vignette(&fallback_vignette(Some("tide"), &mut rng), "tide");
    }

    #[tokio::test]
    async fn test_generate_from_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"response": "a lantern of rain"})),
            )
            .mount(&server)
            .await;

        let generator = ArtifactGenerator::new(OllamaClient::new(server.uri(), DEFAULT_TIMEOUT).unwrap());
        let artifact = generator
            .generate(&GenerateOptions {
                model: Some("llama3".to_string()),
                prompt: Some("rain".to_string()),
                system_prompt: None,
            })
            .await;

        assert!(artifact.id.starts_with("artifact-"));
        assert_eq!(artifact.embedding_text(), "a lantern of rain");
        assert_eq!(artifact.model.as_deref(), Some("llama3"));
        assert_eq!(artifact.tags, vec!["seed", "model-generated"]);
        assert_eq!(artifact.metadata["seeded"], json!(true));
    }

    #[tokio::test]
    async fn test_generate_failure_uses_prompt_as_seed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let generator = ArtifactGenerator::new(OllamaClient::new(server.uri(), DEFAULT_TIMEOUT).unwrap());
        let artifact = generator
            .generate(&GenerateOptions {
                model: Some("llama3".to_string()),
                prompt: Some("rain".to_string()),
                system_prompt: None,
            })
            .await;

        assert_vignette(&artifact.embedding_text(), "rain");
    }

    #[tokio::test]
    async fn test_generate_without_model_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let generator = ArtifactGenerator::new(OllamaClient::new(server.uri(), DEFAULT_TIMEOUT).unwrap());
        let artifact = generator
            .generate(&GenerateOptions {
                prompt: Some("dusk".to_string()),
                ..Default::default()
            })
            .await;

        assert_vignette(&artifact.embedding_text(), "dusk");
        assert!(artifact.model.is_none());
    }
}
