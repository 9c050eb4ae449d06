//! Remote term store contract for termsync.
//!
//! The reconciliation engine never talks to a store directly through
//! ad-hoc calls. It reads committed state through the [`TermStore`] trait
//! and stages every write on an explicit [`ChangeSet`], which only takes
//! effect (and only becomes visible to later reads) once it is passed to
//! [`TermStore::commit`].
//!
//! # Architecture
//!
//! - Reads return owned snapshots ([`GroupInfo`], [`SetInfo`], [`TermInfo`])
//!   so callers never hold references into the store across a commit
//! - Writes are [`Mutation`] values, a closed set of operations
//! - [`PrincipalDirectory`] answers whether an owner/contributor/manager exists
//! - [`MemoryTermStore`] is a complete in-process store with JSON snapshots,
//!   used by tests and by the command-line driver

mod change_set;
mod directory;
mod error;
mod info;
mod memory;
mod normalize;

pub use change_set::{ChangeSet, Mutation, NodeRef, ParentRef};
pub use directory::{MemoryDirectory, OpenDirectory, PrincipalDirectory};
pub use error::{StoreError, StoreResult};
pub use info::{GroupInfo, LabelInfo, SetInfo, TermInfo};
pub use memory::{MemoryTermStore, StoreStats};
pub use normalize::normalize_name;

use termsync_types::{Lcid, TermStoreId};

/// Read and commit access to a remote term store.
///
/// Every read observes committed state only. Implementations must treat a
/// missing node as `Ok(None)`, never as an error.
pub trait TermStore {
    /// Returns the store's canonical form of a name, used for name matching.
    fn normalize_name(&self, name: &str) -> String {
        normalize_name(name)
    }

    /// The language used when a set or term does not specify one.
    fn default_language(&self) -> Lcid;

    /// Looks up a group by Id.
    fn group(&self, id: TermStoreId) -> StoreResult<Option<GroupInfo>>;

    /// Looks up a group by its normalized name.
    fn group_by_name(&self, normalized_name: &str) -> StoreResult<Option<GroupInfo>>;

    /// The one-per-site group.
    fn site_collection_group(&self) -> StoreResult<GroupInfo>;

    /// Looks up a set by Id within a group.
    fn term_set(&self, group: TermStoreId, id: TermStoreId) -> StoreResult<Option<SetInfo>>;

    /// Looks up a set by normalized name within a group.
    fn term_set_by_name(
        &self,
        group: TermStoreId,
        normalized_name: &str,
    ) -> StoreResult<Option<SetInfo>>;

    /// Looks up a term anywhere in the store.
    fn term(&self, id: TermStoreId) -> StoreResult<Option<TermInfo>>;

    /// Direct children of a set or term, in creation order.
    fn child_terms(&self, parent: ParentRef) -> StoreResult<Vec<TermInfo>>;

    /// Whether any group, set or term already uses this Id.
    fn contains_id(&self, id: TermStoreId) -> StoreResult<bool>;

    /// Flushes all staged mutations in one blocking round trip.
    ///
    /// The change set is drained whether or not the commit succeeds; a
    /// failed batch is not retried. Batches committed earlier stay applied.
    fn commit(&mut self, changes: &mut ChangeSet) -> StoreResult<()>;
}
