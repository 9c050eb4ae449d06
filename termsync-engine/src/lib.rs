//! Taxonomy reconciliation engine for termsync.
//!
//! Takes a declarative [`TaxonomyModel`](termsync_model::TaxonomyModel) and
//! makes a remote term store match it: missing groups, sets and terms are
//! created, matched ones are optionally updated, and reused terms are linked
//! to their canonical source. The engine is additive only; it never deletes.
//!
//! # Architecture
//!
//! - **Group/Set resolvers**: find-or-create-or-update one level at a time
//! - **Term reconciler**: recursive walk over a set's tree
//! - **Label/property applier**: labels, shared and local properties of one term
//! - **Sort-order manager**: persists explicit child ordering from ranks
//! - **Reuse resolver**: second pass over reused terms deferred by the walk
//! - **Principal checker**: validates owners, contributors and managers
//!
//! ## Run
//!
//! 1. **Walk**: every group, set and non-reused term is resolved; each node
//!    is committed as its own batch and reloaded before its children
//! 2. **Defer**: reused terms are collected as [`DeferredReuse`] values
//! 3. **Resolve**: the deferred list is drained against the now more
//!    complete store; entries whose source is absent are reported, not created
//!
//! # Example
//!
//! ```
//! use termsync_engine::{ProvisionConfig, TaxonomyProvisioner, TokenRegistry};
//! use termsync_model::{TaxonomyModel, Term, TermGroup, TermSet};
//! use termsync_store::{MemoryTermStore, OpenDirectory};
//! use termsync_types::Lcid;
//!
//! let mut store = MemoryTermStore::new(Lcid::EN_US);
//! let mut tokens = TokenRegistry::new();
//! let mut model = TaxonomyModel::new(vec![
//!     TermGroup::new("Projects").with_set(TermSet::new("Marketing").with_term(Term::new("Cloud"))),
//! ]);
//!
//! let report = TaxonomyProvisioner::new(&mut store, &OpenDirectory, &mut tokens, ProvisionConfig::default())
//!     .provision(&mut model)
//!     .unwrap();
//! assert_eq!(report.terms_created, 1);
//! assert!(model.groups[0].sets[0].terms[0].id.is_some());
//! ```

mod config;
mod error;
mod group;
mod labels;
mod principal;
mod provisioner;
mod report;
mod reuse;
mod set;
mod sort_order;
mod term;
mod tokens;

pub use config::ProvisionConfig;
pub use error::{ProvisionError, ProvisionResult};
pub use provisioner::{SetScope, TaxonomyProvisioner};
pub use report::{PrincipalRole, ProvisionReport, ProvisionWarning, ReuseOutcome};
pub use reuse::DeferredReuse;
pub use sort_order::custom_sort_order;
pub use tokens::{TaxonomyToken, TokenRegistry, TokenResolver};
