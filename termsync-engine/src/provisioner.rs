//! The provisioner: run state, batching and the top-level walk.
//!
//! The resolvers for each level live in their own modules as further
//! `impl TaxonomyProvisioner` blocks; this module owns the shared plumbing
//! they all go through (commit, reload, Id claims and new-Id checks).

use crate::config::ProvisionConfig;
use crate::error::{ProvisionError, ProvisionResult};
use crate::report::ProvisionReport;
use crate::sort_order::SiblingRanks;
use crate::tokens::TokenResolver;
use std::collections::HashMap;
use termsync_model::{TaxonomyModel, UpdateBehavior};
use termsync_store::{
    ChangeSet, GroupInfo, NodeRef, ParentRef, PrincipalDirectory, SetInfo, TermInfo, TermStore,
};
use termsync_types::TermStoreId;
use tracing::{debug, info};

/// Where a term sits: its set and the behavior inherited from its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetScope {
    pub group_id: TermStoreId,
    pub set_id: TermStoreId,
    pub set_name: String,
    pub behavior: UpdateBehavior,
}

impl SetScope {
    pub fn new(
        group_id: TermStoreId,
        set_id: TermStoreId,
        set_name: impl Into<String>,
        behavior: UpdateBehavior,
    ) -> Self {
        Self {
            group_id,
            set_id,
            set_name: set_name.into(),
            behavior,
        }
    }
}

/// Reconciles a [`TaxonomyModel`] against a [`TermStore`].
///
/// Writes are staged on an internal [`ChangeSet`] and committed once per
/// node, so each node is visible (and reloaded) before its children are
/// processed. Resolved Ids are written back into the model.
pub struct TaxonomyProvisioner<'a> {
    pub(crate) store: &'a mut dyn TermStore,
    pub(crate) directory: &'a dyn PrincipalDirectory,
    pub(crate) tokens: &'a mut dyn TokenResolver,
    pub(crate) config: ProvisionConfig,
    pub(crate) changes: ChangeSet,
    /// Remote Ids bound to a model node during this run, with the node's name.
    claimed: HashMap<TermStoreId, String>,
    pub(crate) ranks: HashMap<ParentRef, SiblingRanks>,
    pub(crate) report: ProvisionReport,
}

impl<'a> TaxonomyProvisioner<'a> {
    pub fn new(
        store: &'a mut dyn TermStore,
        directory: &'a dyn PrincipalDirectory,
        tokens: &'a mut dyn TokenResolver,
        config: ProvisionConfig,
    ) -> Self {
        Self {
            store,
            directory,
            tokens,
            config,
            changes: ChangeSet::new(),
            claimed: HashMap::new(),
            ranks: HashMap::new(),
            report: ProvisionReport::default(),
        }
    }

    // ── Run ──────────────────────────────────────────────────────

    /// Reconciles every group of `model`, then resolves the reused terms the
    /// walk deferred.
    ///
    /// On success the model carries the remote Id of every resolved node.
    /// On error, batches committed before the failure stay applied.
    pub fn provision(&mut self, model: &mut TaxonomyModel) -> ProvisionResult<ProvisionReport> {
        self.claimed.clear();
        self.ranks.clear();
        self.report = ProvisionReport::default();

        info!("Provisioning {} term group(s)", model.groups.len());

        let mut deferred = Vec::new();
        for group in model.groups.iter_mut() {
            self.provision_group(group, &mut deferred)?;
        }

        if !deferred.is_empty() {
            info!("Resolving {} deferred reused term(s)", deferred.len());
            self.resolve_reuse(deferred)?;
        }
        self.flush()?;

        let report = self.take_report();
        info!(
            "Provisioning complete: {} created, {} warning(s), {} unresolved reuse",
            report.created(),
            report.warnings.len(),
            report.unresolved_reuse.len()
        );
        Ok(report)
    }

    /// Returns the report accumulated so far and starts a fresh one.
    pub fn take_report(&mut self) -> ProvisionReport {
        std::mem::take(&mut self.report)
    }

    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    // ── Batching ─────────────────────────────────────────────────

    /// Commits all staged mutations as one batch.
    pub fn flush(&mut self) -> ProvisionResult<()> {
        if self.changes.is_empty() {
            return Ok(());
        }
        debug!("Committing {} staged mutation(s)", self.changes.len());
        self.store.commit(&mut self.changes)?;
        Ok(())
    }

    pub(crate) fn reload_group(&self, id: TermStoreId) -> ProvisionResult<GroupInfo> {
        self.store
            .group(id)?
            .ok_or(ProvisionError::MissingAfterCommit {
                node: NodeRef::Group(id),
            })
    }

    pub(crate) fn reload_set(&self, group: TermStoreId, id: TermStoreId) -> ProvisionResult<SetInfo> {
        self.store
            .term_set(group, id)?
            .ok_or(ProvisionError::MissingAfterCommit {
                node: NodeRef::Set(id),
            })
    }

    pub(crate) fn reload_term(&self, id: TermStoreId) -> ProvisionResult<TermInfo> {
        self.store
            .term(id)?
            .ok_or(ProvisionError::MissingAfterCommit {
                node: NodeRef::Term(id),
            })
    }

    // ── Identity ─────────────────────────────────────────────────

    /// Picks the Id for a node about to be created: the model's explicit Id
    /// when it has one, a fresh Id otherwise.
    ///
    /// An explicit Id already used anywhere in the store means the model
    /// node would collide with an unrelated node, so nothing is staged.
    pub(crate) fn new_node_id(
        &self,
        explicit: Option<TermStoreId>,
        name: &str,
    ) -> ProvisionResult<TermStoreId> {
        self.reject_foreign_id(explicit, name)?;
        Ok(explicit
            .and_then(TermStoreId::non_nil)
            .unwrap_or_else(TermStoreId::new))
    }

    /// Fails when the model node's explicit Id belongs to a node it was not
    /// matched to. Resolvers call this once their Id lookup came back empty
    /// and before they fall back to matching by name.
    pub(crate) fn reject_foreign_id(
        &self,
        explicit: Option<TermStoreId>,
        name: &str,
    ) -> ProvisionResult<()> {
        let Some(id) = explicit.and_then(TermStoreId::non_nil) else {
            return Ok(());
        };
        if self.store.contains_id(id)? {
            return Err(ProvisionError::PreconditionViolation {
                id,
                name: name.to_string(),
                reason: "id is already used by another node in the store".to_string(),
            });
        }
        Ok(())
    }

    /// Binds a remote Id to a model node for the rest of the run. Two model
    /// nodes resolving to the same remote node is an error.
    pub(crate) fn claim(&mut self, id: TermStoreId, name: &str) -> ProvisionResult<()> {
        if let Some(previous) = self.claimed.get(&id) {
            return Err(ProvisionError::PreconditionViolation {
                id,
                name: name.to_string(),
                reason: format!("already resolved by '{previous}' in this run"),
            });
        }
        self.claimed.insert(id, name.to_string());
        Ok(())
    }
}
