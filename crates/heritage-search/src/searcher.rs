//! Cosine-similarity search over stored artifacts.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use heritage_embeddings::{cosine, Embedder};
use heritage_storage::ArtifactStore;
use heritage_types::Artifact;

use crate::ensemble::{fuse_zscores, ModelHits};
use crate::error::SearchError;

/// Results returned when the caller does not ask for a count
pub const DEFAULT_TOP_K: usize = 5;

/// Candidate pool multiplier for each model in an ensemble search
const ENSEMBLE_POOL_FACTOR: usize = 3;

/// A ranked artifact
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub artifact: Artifact,
    pub score: f64,
}

/// Search parameters.
///
/// A non-empty `models` list selects ensemble search; otherwise `model`
/// (if any) drives a single-model search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    pub model: Option<String>,
    pub models: Vec<String>,
    pub weights: HashMap<String, f64>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: DEFAULT_TOP_K,
            model: None,
            models: Vec::new(),
            weights: HashMap::new(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    pub fn with_weight(mut self, model: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(model.into(), weight);
        self
    }

    /// Ensemble models with empty names dropped
    fn ensemble_models(&self) -> Vec<&str> {
        self.models
            .iter()
            .map(String::as_str)
            .filter(|m| !m.is_empty())
            .collect()
    }
}

/// Semantic search over the heritage directory of one base directory.
pub struct SemanticSearcher {
    store: ArtifactStore,
    embedder: Arc<dyn Embedder>,
}

impl SemanticSearcher {
    pub fn new(base_dir: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store: ArtifactStore::new(base_dir),
            embedder,
        }
    }

    /// Run a search. Storage failures are logged and yield no hits.
    pub async fn search(&self, request: &SearchRequest) -> Vec<SearchHit> {
        match self.try_search(request).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Search failed, returning no results");
                Vec::new()
            }
        }
    }

    /// Run a search, surfacing storage failures.
    pub async fn try_search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
        let models = request.ensemble_models();
        if models.is_empty() {
            let model = request.model.as_deref().filter(|m| !m.is_empty());
            return self.search_single(&request.query, request.top_k, model).await;
        }

        let pool = request.top_k.saturating_mul(ENSEMBLE_POOL_FACTOR);
        let mut per_model = Vec::with_capacity(models.len());
        for model in models {
            let hits = self.search_single(&request.query, pool, Some(model)).await?;
            let weight = request.weights.get(model).copied().unwrap_or(1.0);
            debug!(model = %model, hits = hits.len(), weight, "Ensemble member searched");
            per_model.push(ModelHits {
                model: model.to_string(),
                weight,
                hits,
            });
        }

        Ok(fuse_zscores(per_model, request.top_k))
    }

    async fn search_single(
        &self,
        query: &str,
        top_k: usize,
        model: Option<&str>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let artifacts = self.store.list()?;
        if artifacts.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = match self.embedder.embed(model, query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(model = ?model, error = %e, "Query embedding failed, using fallback vector");
                self.embedder.fallback(query)
            }
        };

        let mut hits: Vec<SearchHit> = artifacts
            .into_iter()
            .map(|artifact| {
                let vector = self.comparison_vector(&artifact, model);
                SearchHit {
                    score: cosine(&query_vector, &vector),
                    artifact,
                }
            })
            .collect();

        // Stable sort keeps listing order for equal scores
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    /// Vector an artifact is compared with: the requested model's vector,
    /// then the legacy slot, then any per-model vector, then a fallback
    /// vector computed from content (never persisted).
    fn comparison_vector(&self, artifact: &Artifact, model: Option<&str>) -> Vec<f32> {
        model
            .and_then(|m| artifact.model_embedding(m))
            .or_else(|| artifact.legacy_embedding())
            .or_else(|| artifact.first_model_embedding())
            .unwrap_or_else(|| self.embedder.fallback(&artifact.embedding_text()))
    }
}
