//! Semantic search over the artifact heritage store.
//!
//! Single-model search ranks every stored artifact by cosine similarity to
//! the query embedding. Ensemble search runs one single-model search per
//! model over a wider candidate pool, z-score normalizes each model's
//! scores and blends them:
//!
//! `z(doc, m) = (score(doc, m) - mean_m) / std_m`
//! `ensemble(doc) = sum(weight_m * z(doc, m)) / models_that_returned(doc)`

mod ensemble;
mod error;
mod searcher;

pub use ensemble::{fuse_zscores, ModelHits};
pub use error::SearchError;
pub use searcher::{SearchHit, SearchRequest, SemanticSearcher, DEFAULT_TOP_K};
