//! Declarative taxonomy model for termsync.
//!
//! Defines the in-memory tree a caller hands to the reconciliation engine:
//! - [`TaxonomyModel`]: the root, a list of groups
//! - [`TermGroup`]: top-level container with contributors, managers and an
//!   [`UpdateBehavior`] that applies to everything beneath it
//! - [`TermSet`]: a named collection of terms with its own language and
//!   tagging policy
//! - [`Term`]: a node in a set's tree, with labels, shared/local
//!   properties, a custom rank and reuse flags
//!
//! The engine mutates the tree in place: every empty `id` is filled in with
//! the Id the remote store confirmed or generated.

mod group;
mod term;
mod term_set;

pub use group::{TaxonomyModel, TermGroup, UpdateBehavior};
pub use term::{Term, TermLabel};
pub use term_set::TermSet;

pub(crate) fn default_true() -> bool {
    true
}
