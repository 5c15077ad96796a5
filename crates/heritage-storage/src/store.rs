//! Artifact store: one `{id}.json` document per artifact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use heritage_types::Artifact;

use crate::error::StorageError;
use crate::fs_util::{json_files, validate_id, write_atomic};

/// Subdirectory of the base directory holding artifact files
pub const HERITAGE_DIR_NAME: &str = "heritage";

/// Filter for [`ArtifactStore::query`]. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ArtifactQuery {
    pub tag: Option<String>,
    pub model: Option<String>,
}

impl ArtifactQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Whether an artifact passes this filter
    pub fn matches(&self, artifact: &Artifact) -> bool {
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            if !artifact.has_tag(tag) {
                return false;
            }
        }
        if let Some(model) = self.model.as_deref().filter(|m| !m.is_empty()) {
            if artifact.model.as_deref() != Some(model) {
                return false;
            }
        }
        true
    }
}

/// File-backed artifact store rooted at `{base_dir}/heritage`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store for the given base directory. Nothing is touched on
    /// disk until the first write.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: base_dir.as_ref().join(HERITAGE_DIR_NAME),
        }
    }

    /// Directory holding artifact files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the heritage directory if absent.
    pub fn ensure_dir(&self) -> Result<&Path, StorageError> {
        fs::create_dir_all(&self.dir)?;
        Ok(&self.dir)
    }

    /// Path of the file backing an artifact id
    pub fn artifact_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Persist an artifact, replacing any previous version.
    pub fn save(&self, artifact: &Artifact) -> Result<PathBuf, StorageError> {
        validate_id(&artifact.id)?;
        self.ensure_dir()?;
        let path = self.artifact_path(&artifact.id);
        write_atomic(&path, &artifact.to_bytes()?)?;
        debug!(artifact_id = %artifact.id, "Saved artifact");
        Ok(path)
    }

    /// Load a single artifact by id.
    pub fn load(&self, id: &str) -> Result<Artifact, StorageError> {
        validate_id(id)?;
        let path = self.artifact_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Artifact::from_bytes(&bytes)?)
    }

    /// Load every artifact, in file-name order.
    ///
    /// A missing directory yields an empty list; unreadable or malformed
    /// files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<Artifact>, StorageError> {
        let mut artifacts = Vec::new();
        for path in json_files(&self.dir)? {
            match read_artifact(&path) {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => warn!(path = ?path, error = %e, "Skipping unreadable artifact file"),
            }
        }
        Ok(artifacts)
    }

    /// Artifacts matching a tag/model filter.
    pub fn query(&self, query: &ArtifactQuery) -> Result<Vec<Artifact>, StorageError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|a| query.matches(a))
            .collect())
    }
}

fn read_artifact(path: &Path) -> Result<Artifact, StorageError> {
    let bytes = fs::read(path)?;
    Ok(Artifact::from_bytes(&bytes)?)
}
