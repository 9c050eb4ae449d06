//! Reuse resolver.
//!
//! A reused term in the model carries the Id of the term it reuses. The walk
//! cannot link it right away because the source may be created later in the
//! same run (in another set or group), so it is deferred. Once every group
//! has been walked, [`TaxonomyProvisioner::resolve_reuse`] drains the
//! deferred entries against the store.
//!
//! A link is a node of its own under the entry's parent. A parent already
//! holding a link to the same source counts as resolved, which keeps reruns
//! from creating duplicate links.

use crate::error::ProvisionResult;
use crate::provisioner::{SetScope, TaxonomyProvisioner};
use crate::report::{ProvisionWarning, ReuseOutcome};
use crate::term::ChildPass;
use std::collections::VecDeque;
use termsync_model::{Term, UpdateBehavior};
use termsync_store::{LabelInfo, ParentRef, TermInfo};
use termsync_types::{Lcid, TermStoreId};
use tracing::{debug, info, warn};

/// A reused term waiting for its source to be linked.
#[derive(Debug)]
pub struct DeferredReuse<'m> {
    /// The model node. Its `id` names the source term.
    pub term: &'m mut Term,
    /// Where the link goes.
    pub parent: ParentRef,
    pub scope: SetScope,
}

impl TaxonomyProvisioner<'_> {
    /// Resolves deferred reused terms in order.
    ///
    /// Each entry either links its source under the entry's parent or is
    /// reported unresolved; nothing is created for an entry whose source is
    /// missing. Reused children found under a new link are queued behind
    /// the current entries. Returns one outcome per processed entry.
    pub fn resolve_reuse<'m>(
        &mut self,
        entries: Vec<DeferredReuse<'m>>,
    ) -> ProvisionResult<Vec<ReuseOutcome>> {
        let mut queue: VecDeque<DeferredReuse<'m>> = entries.into();
        let mut outcomes = Vec::new();

        while let Some(entry) = queue.pop_front() {
            let outcome = self.resolve_entry(entry, &mut queue)?;
            if !outcome.success {
                self.report.unresolved_reuse.push(outcome.clone());
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn resolve_entry<'m>(
        &mut self,
        entry: DeferredReuse<'m>,
        queue: &mut VecDeque<DeferredReuse<'m>>,
    ) -> ProvisionResult<ReuseOutcome> {
        let DeferredReuse {
            term,
            parent,
            scope,
        } = entry;
        self.flush()?;

        let name = self.tokens.parse_string(&term.name);
        let Some(source_id) = term.id.and_then(TermStoreId::non_nil) else {
            warn!("Reused term '{}' has no source id, skipping", name);
            self.report
                .warnings
                .push(ProvisionWarning::ReuseWithoutId { term: name.clone() });
            return Ok(ReuseOutcome::unresolved(None, name, parent));
        };

        let Some(source) = self.store.term(source_id)? else {
            warn!(
                "Source term {} for '{}' not found, leaving it unresolved",
                source_id, name
            );
            return Ok(ReuseOutcome::unresolved(Some(source_id), name, parent));
        };

        let link = match self.existing_reuse_link(parent, source_id)? {
            Some(link) => {
                debug!("'{}' is already reused under {} as {}", name, parent, link.id);
                if scope.behavior == UpdateBehavior::Overwrite {
                    self.stage_reuse_data(term, &link.labels, link.id, link.language);
                    self.flush()?;
                    self.reload_term(link.id)?
                } else {
                    link
                }
            }
            None => self.create_reuse_link(term, &source, parent)?,
        };

        let rank = term.custom_sort_order;
        if rank > 0 {
            self.record_ranks(parent, &scope, vec![(link.id, rank)])?;
            self.commit_sort_order(parent)?;
        }

        let mut nested = Vec::new();
        self.reconcile_children(
            &mut term.terms,
            ParentRef::Term(link.id),
            &scope,
            ChildPass::Reuse,
            &mut nested,
        )?;
        queue.extend(nested);

        Ok(ReuseOutcome::resolved(source_id, name, parent, link.id))
    }

    fn create_reuse_link(
        &mut self,
        term: &Term,
        source: &TermInfo,
        parent: ParentRef,
    ) -> ProvisionResult<TermInfo> {
        let link_id = TermStoreId::new();
        info!(
            "Reusing term '{}' ({}) under {} as {}",
            source.name, source.id, parent, link_id
        );

        // Source terms carry their shared data over and become the
        // canonical copy of the reuse family.
        self.changes
            .reuse_term(parent, link_id, source.id, term.is_source_term);
        let labels = if term.is_source_term {
            self.changes.reassign_source_term(source.id, link_id);
            source.labels.clone()
        } else {
            vec![LabelInfo {
                value: source.name.clone(),
                language: source.language,
                is_default_for_language: true,
            }]
        };
        self.stage_reuse_data(term, &labels, link_id, source.language);

        self.flush()?;
        self.report.reuse_links_created += 1;
        self.reload_term(link_id)
    }

    /// Labels and shared properties follow the source flag; local
    /// properties always apply to the link.
    fn stage_reuse_data(
        &mut self,
        term: &Term,
        current_labels: &[LabelInfo],
        link_id: TermStoreId,
        name_language: Lcid,
    ) {
        if term.is_source_term {
            self.stage_labels(link_id, &term.name, &term.labels, current_labels, name_language);
        }
        self.stage_properties(link_id, term, term.is_source_term);
    }

    /// The link under `parent` that was created from `source`, if any.
    pub(crate) fn existing_reuse_link(
        &self,
        parent: ParentRef,
        source: TermStoreId,
    ) -> ProvisionResult<Option<TermInfo>> {
        Ok(self
            .store
            .child_terms(parent)?
            .into_iter()
            .find(|t| t.reused_from == Some(source)))
    }
}
