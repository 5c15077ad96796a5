//! Staging queue: durable record of (artifact, model) pairs awaiting an
//! embedding retry.
//!
//! Each pair is one `{artifactId}-{model}.json` file with both parts
//! percent-encoded. Re-adding a pair rewrites its timestamp; removing a
//! pair that is already gone is a no-op, which is what makes overlapping
//! "list, then remove by key" passes safe.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use heritage_types::StagingEntry;

use crate::error::StorageError;
use crate::fs_util::{json_files, write_atomic};

/// Subdirectory of the base directory holding staging files
pub const STAGING_DIR_NAME: &str = "staging-embeddings";

/// File-backed staging queue rooted at `{base_dir}/staging-embeddings`.
#[derive(Debug, Clone)]
pub struct StagingQueue {
    dir: PathBuf,
}

impl StagingQueue {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: base_dir.as_ref().join(STAGING_DIR_NAME),
        }
    }

    /// Directory holding staging files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, artifact_id: &str, model: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", StagingEntry::key_for(artifact_id, model)))
    }

    /// Stage a pair, overwriting any existing record for the same key.
    pub fn add(&self, artifact_id: &str, model: &str) -> Result<StagingEntry, StorageError> {
        if artifact_id.is_empty() || model.is_empty() {
            return Err(StorageError::InvalidId(format!(
                "staging key needs artifact id and model, got '{artifact_id}' / '{model}'"
            )));
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(artifact_id, model);
        if let Some(existing) = read_entry(&path)? {
            if !existing.is_for(artifact_id, model) {
                return Err(StorageError::KeyConflict(format!(
                    "'{artifact_id}' / '{model}' shares a file with '{}' / '{}'",
                    existing.artifact_id, existing.model
                )));
            }
        }
        let entry = StagingEntry::new(artifact_id, model);
        write_atomic(&path, &entry.to_bytes()?)?;
        debug!(artifact_id = %artifact_id, model = %model, "Staged embedding");
        Ok(entry)
    }

    /// All current entries. A missing or empty queue yields an empty list;
    /// malformed files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<StagingEntry>, StorageError> {
        let mut entries = Vec::new();
        for path in json_files(&self.dir)? {
            match fs::read(&path)
                .map_err(StorageError::from)
                .and_then(|bytes| StagingEntry::from_bytes(&bytes).map_err(StorageError::from))
            {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(path = ?path, error = %e, "Skipping unreadable staging file"),
            }
        }
        Ok(entries)
    }

    /// Best-effort delete. Returns whether a record was removed; an absent
    /// record is not an error. A file holding a different pair under the
    /// same key is left alone.
    pub fn remove(&self, artifact_id: &str, model: &str) -> Result<bool, StorageError> {
        let path = self.entry_path(artifact_id, model);
        if let Some(existing) = read_entry(&path)? {
            if !existing.is_for(artifact_id, model) {
                debug!(artifact_id = %artifact_id, model = %model, "Staging file belongs to another pair");
                return Ok(false);
            }
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(artifact_id = %artifact_id, model = %model, "Removed staging entry");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of staged entries
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.list()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

/// Entry stored at `path`. Missing files and unparseable contents are `None`.
fn read_entry(path: &Path) -> Result<Option<StagingEntry>, StorageError> {
    match fs::read(path) {
        Ok(bytes) => Ok(StagingEntry::from_bytes(&bytes).ok()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_missing_queue_is_empty() {
        let temp = TempDir::new().unwrap();
        let queue = StagingQueue::new(temp.path());
        assert!(queue.list().unwrap().is_empty());
        assert!(queue.is_empty().unwrap());
    }

    #[test]
    fn test_add_list_remove() {
        let temp = TempDir::new().unwrap();
        let queue = StagingQueue::new(temp.path());

        queue.add("a1", "nomic-embed-text").unwrap();
        queue.add("a2", "nomic-embed-text").unwrap();
        assert!(queue
            .dir()
            .join("a1-nomic-embed-text.json")
            .exists());

        let mut entries = queue.list().unwrap();
        entries.sort_by(|a, b| a.artifact_id.cmp(&b.artifact_id));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].artifact_id, "a1");
        assert_eq!(entries[0].model, "nomic-embed-text");

        assert!(queue.remove("a1", "nomic-embed-text").unwrap());
        assert_eq!(queue.len().unwrap(), 1);
    }

    #[test]
    fn test_add_same_pair_overwrites() {
        let temp = TempDir::new().unwrap();
        let queue = StagingQueue::new(temp.path());

        let first = queue.add("a1", "m").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = queue.add("a1", "m").unwrap();

        let entries = queue.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(second.timestamp > first.timestamp);
        assert_eq!(entries[0].timestamp, second.timestamp);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let temp = TempDir::new().unwrap();
        let queue = StagingQueue::new(temp.path());
        assert!(!queue.remove("ghost", "m").unwrap());

        queue.add("a1", "m").unwrap();
        assert!(queue.remove("a1", "m").unwrap());
        assert!(!queue.remove("a1", "m").unwrap());
    }

    #[test]
    fn test_model_with_path_characters() {
        let temp = TempDir::new().unwrap();
        let queue = StagingQueue::new(temp.path());

        queue.add("a1", "library/llama3:latest").unwrap();
        let entries = queue.list().unwrap();
        assert_eq!(entries[0].model, "library/llama3:latest");
        assert!(queue.remove("a1", "library/llama3:latest").unwrap());
    }

    #[test]
    fn test_escaped_models_stay_distinct() {
        let temp = TempDir::new().unwrap();
        let queue = StagingQueue::new(temp.path());

        queue.add("a1", "x/y").unwrap();
        queue.add("a1", "x_y").unwrap();

        let mut models: Vec<String> = queue.list().unwrap().into_iter().map(|e| e.model).collect();
        models.sort();
        assert_eq!(models, vec!["x/y", "x_y"]);

        assert!(queue.remove("a1", "x/y").unwrap());
        let remaining = queue.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].model, "x_y");
    }

    #[test]
    fn test_dash_joined_keys_never_clobber() {
        let temp = TempDir::new().unwrap();
        let queue = StagingQueue::new(temp.path());

        queue.add("a-b", "c").unwrap();
        let err = queue.add("a", "b-c").unwrap_err();
        assert!(matches!(err, StorageError::KeyConflict(_)));

        assert!(!queue.remove("a", "b-c").unwrap());
        let entries = queue.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_for("a-b", "c"));
    }

    #[test]
    fn test_add_rejects_empty_key() {
        let temp = TempDir::new().unwrap();
        let queue = StagingQueue::new(temp.path());
        assert!(queue.add("", "m").is_err());
        assert!(queue.add("a1", "").is_err());
    }
}
