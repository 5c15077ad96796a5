//! End-to-end test infrastructure for the artifact heritage library.
//!
//! Provides a shared TestHarness and test embedders for scenarios that
//! span storage, indexing, staging, the sleep daemon and search.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use heritage_embeddings::{Embedder, EmbeddingError, HeritageEmbedder, DEFAULT_DIMENSION};
use heritage_indexing::{Indexer, StagingProcessor};
use heritage_search::SemanticSearcher;
use heritage_storage::{ArtifactStore, StagingQueue};
use heritage_types::Artifact;

/// Shared test harness for E2E tests.
///
/// Owns a temporary base directory and hands out components rooted in it.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    pub store: ArtifactStore,
    pub staging: StagingQueue,
    pub embedder: Arc<dyn Embedder>,
}

impl TestHarness {
    /// Harness whose embedder only produces fallback vectors.
    pub fn new() -> Self {
        Self::with_embedder(Arc::new(HeritageEmbedder::fallback_only(DEFAULT_DIMENSION)))
    }

    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        Self {
            store: ArtifactStore::new(temp_dir.path()),
            staging: StagingQueue::new(temp_dir.path()),
            _temp_dir: temp_dir,
            embedder,
        }
    }

    pub fn base_dir(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Record and persist a text artifact.
    pub fn record(&self, text: &str, tags: &[&str]) -> Artifact {
        let artifact = Artifact::record(text, tags.iter().map(|t| t.to_string()).collect());
        self.store.save(&artifact).expect("Failed to save artifact");
        artifact
    }

    pub fn indexer(&self) -> Indexer {
        Indexer::new(self.base_dir(), self.embedder.clone())
    }

    pub fn processor(&self) -> StagingProcessor {
        StagingProcessor::new(self.base_dir(), self.embedder.clone())
    }

    pub fn searcher(&self) -> SemanticSearcher {
        SemanticSearcher::new(self.base_dir(), self.embedder.clone())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Embedder whose listed models are unreachable.
///
/// Reachable models return the fallback vector of `"{model}:{text}"`, so
/// different models give different but deterministic vectors.
pub struct PartialOutageEmbedder {
    unreachable: HashSet<String>,
}

impl PartialOutageEmbedder {
    pub fn new(unreachable: &[&str]) -> Self {
        Self {
            unreachable: unreachable.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[async_trait]
impl Embedder for PartialOutageEmbedder {
    async fn embed(&self, model: Option<&str>, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match model {
            None => Ok(self.fallback(text)),
            Some(m) if self.unreachable.contains(m) => {
                Err(EmbeddingError::Request(format!("{m} unreachable")))
            }
            Some(m) => Ok(self.fallback(&format!("{m}:{text}"))),
        }
    }
}
