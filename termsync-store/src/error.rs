//! Error types for the store layer.

use termsync_types::TermStoreId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A mutation referenced a node that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A create mutation reused an Id already present in the store.
    #[error("id already in use: {0}")]
    DuplicateId(TermStoreId),

    /// The store rejected a mutation as invalid for its target.
    #[error("invalid mutation: {0}")]
    InvalidMutation(String),

    /// Transport or server failure while talking to the store.
    #[error("remote operation failed: {0}")]
    Remote(String),

    /// IO error (snapshot files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
