//! Core type definitions for termsync.
//!
//! This crate defines the identifier types shared by the model, the remote
//! store contract and the reconciliation engine:
//! - Term store identifiers (UUID, v7 when generated locally)
//! - Locale identifiers used for set languages and term labels
//!
//! Taxonomy structure (groups, sets, terms) lives in `termsync-model`.

mod ids;
mod lcid;

pub use ids::TermStoreId;
pub use lcid::Lcid;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing identifier types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid locale identifier: {0}")]
    InvalidLcid(String),
}
