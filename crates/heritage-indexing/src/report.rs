//! Summary of an index pass.

use serde::Serialize;

/// Result of one index pass.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct IndexReport {
    /// Artifacts that received at least one new vector, in listing order
    pub updated: Vec<String>,
    /// (artifact, model) pairs written to the staging queue
    pub staged: usize,
    /// Artifacts left untouched (already indexed, unreadable, failed save)
    pub skipped: usize,
}

impl IndexReport {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an updated artifact.
    pub fn record_update(&mut self, artifact_id: impl Into<String>) {
        self.updated.push(artifact_id.into());
    }

    /// Record a staged pair.
    pub fn record_staged(&mut self) {
        self.staged += 1;
    }

    /// Record a skipped artifact.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Check if any artifact was updated.
    pub fn has_updates(&self) -> bool {
        !self.updated.is_empty()
    }
}
