//! Search error types.

use heritage_storage::StorageError;
use thiserror::Error;

/// Errors from [`crate::SemanticSearcher::try_search`].
///
/// [`crate::SemanticSearcher::search`] logs these and returns no hits.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Heritage directory could not be read
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
