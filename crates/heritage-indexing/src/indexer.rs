//! Indexer: fills in missing embeddings across the artifact store.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use heritage_embeddings::Embedder;
use heritage_storage::{ArtifactStore, StagingQueue};
use heritage_types::{Artifact, FALLBACK_MODEL_ID};

use crate::error::IndexingError;
use crate::report::IndexReport;
use crate::selection::ModelSelection;

/// Walks the artifact store and computes embeddings.
///
/// Artifacts are processed one at a time; each touched artifact is
/// rewritten as a whole. A failing model never aborts the pass: the
/// `(artifact, model)` pair is staged for the sleep daemon instead.
pub struct Indexer {
    store: ArtifactStore,
    staging: StagingQueue,
    embedder: Arc<dyn Embedder>,
}

impl Indexer {
    pub fn new(base_dir: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store: ArtifactStore::new(base_dir.as_ref()),
            staging: StagingQueue::new(base_dir.as_ref()),
            embedder,
        }
    }

    /// Run one index pass.
    ///
    /// Only fails when the heritage directory itself cannot be created or
    /// listed; per-artifact problems are logged and counted as skipped.
    pub async fn index(&self, selection: &ModelSelection) -> Result<IndexReport, IndexingError> {
        self.store.ensure_dir()?;
        let artifacts = self.store.list()?;

        let models = selection.models();
        let mut report = IndexReport::new();

        for artifact in artifacts {
            if models.is_empty() {
                self.index_fallback(artifact, &mut report).await;
            } else {
                self.index_models(artifact, &models, &mut report).await;
            }
        }

        info!(
            updated = report.updated.len(),
            staged = report.staged,
            skipped = report.skipped,
            models = ?models,
            "Index pass complete"
        );
        Ok(report)
    }

    async fn index_fallback(&self, mut artifact: Artifact, report: &mut IndexReport) {
        if artifact.legacy_embedding().is_some() {
            debug!(artifact_id = %artifact.id, "Already indexed, skipping");
            report.record_skip();
            return;
        }

        let text = artifact.embedding_text();
        let vector = match self.embedder.embed(None, &text).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(artifact_id = %artifact.id, error = %e, "Fallback embedding failed");
                self.embedder.fallback(&text)
            }
        };

        artifact.set_legacy_embedding(&vector, FALLBACK_MODEL_ID);
        self.persist(&artifact, report);
    }

    async fn index_models(&self, mut artifact: Artifact, models: &[&str], report: &mut IndexReport) {
        let text = artifact.embedding_text();
        let mut changed = false;

        for &model in models {
            match self.embedder.embed(Some(model), &text).await {
                Ok(vector) => {
                    artifact.set_model_embedding(model, &vector);
                    changed = true;
                }
                Err(e) => {
                    warn!(artifact_id = %artifact.id, model = %model, error = %e, "Embedding failed, staging");
                    match self.staging.add(&artifact.id, model) {
                        Ok(_) => report.record_staged(),
                        Err(e) => {
                            warn!(artifact_id = %artifact.id, model = %model, error = %e, "Failed to stage embedding")
                        }
                    }
                }
            }
        }

        if changed {
            self.persist(&artifact, report);
        } else {
            report.record_skip();
        }
    }

    fn persist(&self, artifact: &Artifact, report: &mut IndexReport) {
        match self.store.save(artifact) {
            Ok(_) => {
                debug!(artifact_id = %artifact.id, "Indexed artifact");
                report.record_update(artifact.id.clone());
            }
            Err(e) => {
                warn!(artifact_id = %artifact.id, error = %e, "Failed to save artifact");
                report.record_skip();
            }
        }
    }
}
