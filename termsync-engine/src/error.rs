//! Error types for the reconciliation engine.
//!
//! Only conditions that abort a run are errors. Missing principals, label
//! language conflicts and unavailable reuse sources are recovered locally
//! and reported through [`ProvisionReport`](crate::ProvisionReport).

use termsync_store::{NodeRef, StoreError};
use termsync_types::TermStoreId;
use thiserror::Error;

/// Result type for engine operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors that abort a reconciliation run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// An explicit Id is already used by a different node. Raised before any
    /// mutation for the offending node is staged.
    #[error("precondition violated for '{name}' ({id}): {reason}")]
    PreconditionViolation {
        id: TermStoreId,
        name: String,
        reason: String,
    },

    /// The store rejected a read or a commit. Batches committed earlier stay
    /// applied.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A node that was just committed could not be read back.
    #[error("{node} missing after commit")]
    MissingAfterCommit { node: NodeRef },
}
