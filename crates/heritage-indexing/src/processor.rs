//! Staging processor: one retry attempt per staged `(artifact, model)` pair.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use heritage_embeddings::Embedder;
use heritage_storage::{ArtifactStore, StagingQueue};
use heritage_types::StagingEntry;

use crate::error::IndexingError;

/// Options for a processing pass
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Use the fallback vector instead of calling the staged model
    pub force_fallback: bool,
}

impl ProcessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_force_fallback(mut self, force_fallback: bool) -> Self {
        self.force_fallback = force_fallback;
        self
    }
}

/// Outcome for one staged entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEntry {
    pub artifact_id: String,
    pub model: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Drains the staging queue.
///
/// The queue is snapshotted when a pass starts, so entries staged while it
/// runs wait for the next pass. Every snapshotted entry is removed after
/// its single attempt, whether or not the attempt succeeded. Removing a key
/// another pass already consumed is a no-op, which keeps overlapping passes
/// safe without a lock.
pub struct StagingProcessor {
    store: ArtifactStore,
    staging: StagingQueue,
    embedder: Arc<dyn Embedder>,
}

impl StagingProcessor {
    pub fn new(base_dir: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store: ArtifactStore::new(base_dir.as_ref()),
            staging: StagingQueue::new(base_dir.as_ref()),
            embedder,
        }
    }

    /// Process every currently staged entry, each with its own model.
    pub async fn process(&self, options: &ProcessOptions) -> Result<Vec<ProcessedEntry>, IndexingError> {
        let snapshot: Vec<StagingEntry> = self.staging.list()?;

        let mut results = Vec::with_capacity(snapshot.len());
        for entry in snapshot {
            let outcome = self.process_entry(&entry, options.force_fallback).await;
            if let Err(e) = &outcome {
                warn!(artifact_id = %entry.artifact_id, model = %entry.model, error = %e, "Staged embedding failed");
            }

            if let Err(e) = self.staging.remove(&entry.artifact_id, &entry.model) {
                warn!(artifact_id = %entry.artifact_id, model = %entry.model, error = %e, "Failed to remove staging entry");
            }

            results.push(ProcessedEntry {
                artifact_id: entry.artifact_id,
                model: entry.model,
                success: outcome.is_ok(),
                error: outcome.err().map(|e| e.to_string()),
            });
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        info!(
            processed = results.len(),
            succeeded,
            failed = results.len() - succeeded,
            "Staging pass complete"
        );
        Ok(results)
    }

    async fn process_entry(&self, entry: &StagingEntry, force_fallback: bool) -> Result<(), IndexingError> {
        let mut artifact = self.store.load(&entry.artifact_id)?;
        let text = artifact.embedding_text();

        let model = if force_fallback { None } else { Some(entry.model.as_str()) };
        let vector = self.embedder.embed(model, &text).await?;

        artifact.set_model_embedding(&entry.model, &vector);
        self.store.save(&artifact)?;
        debug!(artifact_id = %entry.artifact_id, model = %entry.model, "Processed staged embedding");
        Ok(())
    }
}
