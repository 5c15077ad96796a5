//! Artifact type for heritage storage.
//!
//! Artifacts are short creative units (text, image or sound references)
//! persisted one JSON document per artifact. Embeddings live inside the
//! open `metadata` mapping so that files written by other tools keep
//! every field they carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key of the legacy single-vector slot.
pub const EMBEDDING_KEY: &str = "embedding";

/// Metadata key of the per-model vector map.
pub const EMBEDDINGS_KEY: &str = "embeddings";

/// Metadata key naming the model that produced the legacy vector.
pub const EMBEDDING_MODEL_KEY: &str = "embeddingModel";

/// Metadata key listing the models present in the per-model map.
pub const EMBEDDING_MODELS_KEY: &str = "embeddingModels";

/// Model tag recorded for vectors produced by the deterministic hash.
pub const FALLBACK_MODEL_ID: &str = "fallback-hash";

/// Kind of a content segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Image,
    Sound,
}

/// One segment of artifact content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactContent {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub data: String,
}

impl ArtifactContent {
    /// Create a text segment
    pub fn text(data: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Text,
            data: data.into(),
        }
    }
}

/// A persisted creative unit.
///
/// The id is immutable once created. Every other field may be rewritten by
/// a read-modify-write of the whole record; unknown top-level fields are
/// carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Globally unique identifier, also the file stem on disk
    pub id: String,

    /// Model that generated the content, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Prompt used for generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// System prompt used for generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Ordered content segments
    #[serde(default)]
    pub content: Vec<ArtifactContent>,

    /// Tags in insertion order
    #[serde(default)]
    pub tags: Vec<String>,

    /// Open metadata mapping (embeddings and bookkeeping live here)
    #[serde(default)]
    pub metadata: Map<String, Value>,

    /// Creation time, set once
    pub created_at: DateTime<Utc>,

    /// Fields written by other producers
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Artifact {
    /// Create a new artifact with the given id and content segments
    pub fn new(id: impl Into<String>, content: Vec<ArtifactContent>) -> Self {
        Self {
            id: id.into(),
            model: None,
            prompt: None,
            system_prompt: None,
            content,
            tags: Vec::new(),
            metadata: Map::new(),
            created_at: Utc::now(),
            extra: Map::new(),
        }
    }

    /// Record a single text artifact with a freshly generated id.
    pub fn record(text: impl Into<String>, tags: Vec<String>) -> Self {
        Self::new(Self::generate_id(), vec![ArtifactContent::text(text)]).with_tags(tags)
    }

    /// Generate a new unique artifact id (`artifact-<ulid>`).
    pub fn generate_id() -> String {
        format!("artifact-{}", ulid::Ulid::new().to_string().to_lowercase())
    }

    /// Set tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set provenance fields
    pub fn with_provenance(
        mut self,
        model: Option<String>,
        prompt: Option<String>,
        system_prompt: Option<String>,
    ) -> Self {
        self.model = model;
        self.prompt = prompt;
        self.system_prompt = system_prompt;
        self
    }

    /// Text used for embedding: every segment's data joined by newlines.
    pub fn embedding_text(&self) -> String {
        self.content
            .iter()
            .map(|c| c.data.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the artifact carries the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Legacy single vector, if present and numeric.
    pub fn legacy_embedding(&self) -> Option<Vec<f32>> {
        self.metadata.get(EMBEDDING_KEY).and_then(vector_from_value)
    }

    /// Store the legacy vector and record the model that produced it.
    pub fn set_legacy_embedding(&mut self, vector: &[f32], model_tag: &str) {
        self.metadata
            .insert(EMBEDDING_KEY.to_string(), vector_to_value(vector));
        self.metadata.insert(
            EMBEDDING_MODEL_KEY.to_string(),
            Value::String(model_tag.to_string()),
        );
    }

    /// Vector stored for a specific model, if present and numeric.
    pub fn model_embedding(&self, model: &str) -> Option<Vec<f32>> {
        self.embeddings_map()
            .and_then(|m| m.get(model))
            .and_then(vector_from_value)
    }

    /// First vector found in the per-model map, in stored key order.
    pub fn first_model_embedding(&self) -> Option<Vec<f32>> {
        self.embeddings_map()
            .and_then(|m| m.values().next())
            .and_then(vector_from_value)
    }

    /// Store a per-model vector and refresh the list of present models.
    pub fn set_model_embedding(&mut self, model: &str, vector: &[f32]) {
        let entry = self
            .metadata
            .entry(EMBEDDINGS_KEY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(model.to_string(), vector_to_value(vector));
        }
        self.refresh_embedding_models();
    }

    /// Model ids present in the per-model map.
    pub fn embedding_models(&self) -> Vec<String> {
        self.embeddings_map()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn refresh_embedding_models(&mut self) {
        let models: Vec<Value> = self
            .embedding_models()
            .into_iter()
            .map(Value::String)
            .collect();
        self.metadata
            .insert(EMBEDDING_MODELS_KEY.to_string(), Value::Array(models));
    }

    fn embeddings_map(&self) -> Option<&Map<String, Value>> {
        self.metadata.get(EMBEDDINGS_KEY).and_then(Value::as_object)
    }

    /// Serialize to pretty JSON bytes (on-disk format)
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Read a JSON array of numbers as a vector. Empty or non-numeric arrays
/// count as absent.
fn vector_from_value(value: &Value) -> Option<Vec<f32>> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

fn vector_to_value(vector: &[f32]) -> Value {
    Value::Array(vector.iter().map(|&x| Value::from(f64::from(x))).collect())
}
