//! Term reconciler: the recursive walk over a set's term tree.

use crate::error::ProvisionResult;
use crate::provisioner::{SetScope, TaxonomyProvisioner};
use crate::report::PrincipalRole;
use crate::reuse::DeferredReuse;
use crate::tokens::TaxonomyToken;
use termsync_model::{Term, UpdateBehavior};
use termsync_store::{LabelInfo, NodeRef, ParentRef, TermInfo};
use termsync_types::TermStoreId;
use tracing::{debug, info};

/// Which pass is walking a list of children.
///
/// The walk defers reused terms that are not source terms, and source terms
/// whose Id already names a term outside the parent. Under a reuse link every
/// reused child is deferred, because the reuse resolver is what handles the
/// source flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChildPass {
    Walk,
    Reuse,
}

impl TaxonomyProvisioner<'_> {
    /// Reconciles every child of `parent` in model order, then persists the
    /// sibling ordering if any child carries a rank.
    pub(crate) fn reconcile_children<'m>(
        &mut self,
        children: &'m mut [Term],
        parent: ParentRef,
        scope: &SetScope,
        pass: ChildPass,
        deferred: &mut Vec<DeferredReuse<'m>>,
    ) -> ProvisionResult<()> {
        let mut ranked = Vec::new();
        let mut any_ranked = false;

        for term in children.iter_mut() {
            let rank = term.custom_sort_order;
            any_ranked |= rank > 0;

            if self.defers(pass, term, parent)? {
                // A link from an earlier run already has a place in the order.
                if rank > 0 {
                    if let Some(source) = term.id {
                        if let Some(link) = self.existing_reuse_link(parent, source)? {
                            ranked.push((link.id, rank));
                        }
                    }
                }
                debug!("Deferring reused term '{}' under {}", term.name, parent);
                deferred.push(DeferredReuse {
                    term,
                    parent,
                    scope: scope.clone(),
                });
                continue;
            }

            let id = self.reconcile_term(term, parent, scope, deferred)?;
            if rank > 0 {
                ranked.push((id, rank));
            }
        }

        if any_ranked {
            self.record_ranks(parent, scope, ranked)?;
            self.commit_sort_order(parent)?;
        }
        Ok(())
    }

    fn defers(&self, pass: ChildPass, term: &Term, parent: ParentRef) -> ProvisionResult<bool> {
        match pass {
            ChildPass::Reuse => Ok(term.is_reused),
            ChildPass::Walk if term.is_deferred_reuse() => Ok(true),
            ChildPass::Walk => self.reuses_existing_source(term, parent),
        }
    }

    /// A reused source term whose Id is a term elsewhere in the store links
    /// to that term. If the Id is unknown it is created as a plain term.
    fn reuses_existing_source(&self, term: &Term, parent: ParentRef) -> ProvisionResult<bool> {
        if !term.is_reused {
            return Ok(false);
        }
        let Some(id) = term.id.and_then(TermStoreId::non_nil) else {
            return Ok(false);
        };
        if self.store.child_terms(parent)?.iter().any(|t| t.id == id) {
            return Ok(false);
        }
        Ok(self.store.term(id)?.is_some())
    }

    /// Resolves one term and recurses into its children. Returns the remote
    /// Id the term was bound to.
    pub(crate) fn reconcile_term<'m>(
        &mut self,
        term: &'m mut Term,
        parent: ParentRef,
        scope: &SetScope,
        deferred: &mut Vec<DeferredReuse<'m>>,
    ) -> ProvisionResult<TermStoreId> {
        let info = self.resolve_term(term, parent, scope)?;
        self.reconcile_children(
            &mut term.terms,
            ParentRef::Term(info.id),
            scope,
            ChildPass::Walk,
            deferred,
        )?;
        Ok(info.id)
    }

    /// Finds, creates or updates the remote term for `term` under `parent`,
    /// commits, and returns the reloaded term.
    ///
    /// Matching looks at the parent's direct children only: by Id first,
    /// then by normalized name among nodes that are not reuse links. An
    /// explicit Id that names some other node in the store is rejected
    /// before the name lookup.
    pub fn resolve_term(
        &mut self,
        term: &mut Term,
        parent: ParentRef,
        scope: &SetScope,
    ) -> ProvisionResult<TermInfo> {
        let name = self.tokens.parse_string(&term.name);
        let normalized = self.store.normalize_name(&name);

        let siblings = self.store.child_terms(parent)?;
        let mut existing = term
            .id
            .and_then(|id| siblings.iter().find(|t| t.id == id))
            .cloned();
        if existing.is_none() {
            self.reject_foreign_id(term.id, &name)?;
            existing = siblings
                .iter()
                .find(|t| !t.is_reused() && t.name == normalized)
                .cloned();
        }

        let (id, existing) = match existing {
            Some(info) => (info.id, Some(info)),
            None => (self.new_node_id(term.id, &name)?, None),
        };
        self.claim(id, &name)?;

        match existing {
            Some(info) => {
                if scope.behavior == UpdateBehavior::Overwrite {
                    debug!("Updating term '{}' ({})", info.name, id);
                    self.stage_term_update(term, &info, &normalized)?;
                    self.report.terms_updated += 1;
                }
            }
            None => {
                self.stage_term_create(term, id, parent, &name)?;
                self.report.terms_created += 1;
            }
        }

        term.id = Some(id);
        self.flush()?;
        let info = self.reload_term(id)?;
        self.tokens.add_token(TaxonomyToken::Term {
            set: scope.set_name.clone(),
            name: info.name.clone(),
            id,
        });
        Ok(info)
    }

    fn stage_term_create(
        &mut self,
        term: &Term,
        id: TermStoreId,
        parent: ParentRef,
        name: &str,
    ) -> ProvisionResult<()> {
        let language = term
            .language
            .unwrap_or_else(|| self.store.default_language());
        info!("Creating term '{}' ({}) under {} (lang={})", name, id, parent, language);
        self.changes.create_child_term(parent, id, name, language);

        let description = self.tokens.parse_string(&term.description);
        if !description.is_empty() {
            self.changes.set_description(NodeRef::Term(id), description);
        }
        if let Some(owner) = &term.owner {
            if let Some(owner) = self.check_principal(owner, PrincipalRole::Owner, name)? {
                self.changes.set_owner(NodeRef::Term(id), owner);
            }
        }
        self.changes
            .set_available_for_tagging(NodeRef::Term(id), term.is_available_for_tagging);

        // A new term starts with its name as the default label.
        let labels = [LabelInfo {
            value: self.store.normalize_name(name),
            language,
            is_default_for_language: true,
        }];
        self.stage_labels(id, name, &term.labels, &labels, language);
        self.stage_properties(id, term, true);

        if term.is_deprecated {
            self.changes.deprecate(id, true);
        }
        Ok(())
    }

    fn stage_term_update(
        &mut self,
        term: &Term,
        info: &TermInfo,
        normalized: &str,
    ) -> ProvisionResult<()> {
        let id = info.id;
        let mut labels = info.labels.clone();
        if info.name != normalized {
            self.changes.set_name(NodeRef::Term(id), normalized);
            // Renaming moves the name label along with it.
            for label in labels.iter_mut() {
                if label.language == info.language && label.value == info.name {
                    label.value = normalized.to_string();
                }
            }
        }
        self.changes
            .set_available_for_tagging(NodeRef::Term(id), term.is_available_for_tagging);

        let description = self.tokens.parse_string(&term.description);
        if description != info.description {
            self.changes.set_description(NodeRef::Term(id), description);
        }

        if let Some(owner) = &term.owner {
            if let Some(owner) = self.check_principal(owner, PrincipalRole::Owner, &info.name)? {
                if info.owner.as_deref() != Some(owner.as_str()) {
                    self.changes.set_owner(NodeRef::Term(id), owner);
                }
            }
        }

        if info.is_deprecated != term.is_deprecated {
            self.changes.deprecate(id, term.is_deprecated);
        }

        self.stage_labels(id, normalized, &term.labels, &labels, info.language);
        self.stage_properties(id, term, true);
        Ok(())
    }
}
