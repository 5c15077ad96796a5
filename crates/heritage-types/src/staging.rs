//! Staging entry type for deferred embedding work.
//!
//! A staging entry is written when an embedding attempt for an
//! (artifact, model) pair fails during indexing. The sleep daemon
//! consumes entries later and removes them after one attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pending unit of embedding work, keyed by `(artifact_id, model)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingEntry {
    /// Artifact whose embedding must be recomputed
    pub artifact_id: String,

    /// Embedding model to retry with
    pub model: String,

    /// When the pair was (last) staged
    pub timestamp: DateTime<Utc>,
}

impl StagingEntry {
    /// Create a new entry stamped with the current time
    pub fn new(artifact_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            model: model.into(),
            timestamp: Utc::now(),
        }
    }

    /// Composite key identifying this entry (`{artifact_id}-{model}`).
    ///
    /// Both parts are percent-encoded, so the key doubles as the on-disk
    /// file stem and distinct ids or models never share one. Plain ids and
    /// model names (alphanumerics, `-`, `_`, `.`, `~`) are kept as is.
    pub fn key(&self) -> String {
        Self::key_for(&self.artifact_id, &self.model)
    }

    /// Composite key for an `(artifact_id, model)` pair.
    pub fn key_for(artifact_id: &str, model: &str) -> String {
        format!(
            "{}-{}",
            urlencoding::encode(artifact_id),
            urlencoding::encode(model)
        )
    }

    /// Whether this entry records the given pair.
    pub fn is_for(&self, artifact_id: &str, model: &str) -> bool {
        self.artifact_id == artifact_id && self.model == model
    }

    /// Serialize to pretty JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
