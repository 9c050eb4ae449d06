//! Term set resolver.

use crate::error::ProvisionResult;
use crate::provisioner::{SetScope, TaxonomyProvisioner};
use crate::report::PrincipalRole;
use crate::reuse::DeferredReuse;
use crate::term::ChildPass;
use crate::tokens::TaxonomyToken;
use termsync_model::{TermSet, UpdateBehavior};
use termsync_store::{GroupInfo, NodeRef, ParentRef, SetInfo};
use termsync_types::TermStoreId;
use tracing::{debug, info};

impl TaxonomyProvisioner<'_> {
    /// Resolves one set, then walks its terms.
    pub(crate) fn provision_set<'m>(
        &mut self,
        set: &'m mut TermSet,
        group: &GroupInfo,
        behavior: UpdateBehavior,
        deferred: &mut Vec<DeferredReuse<'m>>,
    ) -> ProvisionResult<()> {
        let info = self.resolve_set(set, group, behavior)?;
        let scope = SetScope::new(group.id, info.id, info.name, behavior);

        self.reconcile_children(
            &mut set.terms,
            ParentRef::Set(scope.set_id),
            &scope,
            ChildPass::Walk,
            deferred,
        )
    }

    /// Finds, creates or updates the remote set for `set` within `group`,
    /// commits, and returns the reloaded set.
    pub fn resolve_set(
        &mut self,
        set: &mut TermSet,
        group: &GroupInfo,
        behavior: UpdateBehavior,
    ) -> ProvisionResult<SetInfo> {
        let name = self.tokens.parse_string(&set.name);
        let normalized = self.store.normalize_name(&name);

        let mut existing = None;
        if let Some(id) = set.id {
            existing = self.store.term_set(group.id, id)?;
        }
        if existing.is_none() {
            self.reject_foreign_id(set.id, &name)?;
            existing = self.store.term_set_by_name(group.id, &normalized)?;
        }

        let (id, existing) = match existing {
            Some(info) => (info.id, Some(info)),
            None => (self.new_node_id(set.id, &name)?, None),
        };
        self.claim(id, &name)?;

        match existing {
            Some(info) => {
                if behavior == UpdateBehavior::Overwrite {
                    debug!("Updating term set '{}' ({})", info.name, id);
                    self.stage_set_fields(id, set, Some(&info), &name)?;
                    self.report.sets_updated += 1;
                } else {
                    debug!("Term set '{}' exists, leaving it unchanged", info.name);
                }
            }
            None => {
                let language = set.language.unwrap_or_else(|| self.store.default_language());
                info!(
                    "Creating term set '{}' ({}) in group '{}' (lang={})",
                    name, id, group.name, language
                );
                self.changes.create_set(group.id, id, &name, language);
                self.stage_set_fields(id, set, None, &name)?;
                self.report.sets_created += 1;
            }
        }

        set.id = Some(id);
        self.flush()?;
        let info = self.reload_set(group.id, id)?;
        self.tokens.add_token(TaxonomyToken::Set {
            group: group.name.clone(),
            name: info.name.clone(),
            id,
        });
        Ok(info)
    }

    fn stage_set_fields(
        &mut self,
        id: TermStoreId,
        set: &TermSet,
        existing: Option<&SetInfo>,
        name: &str,
    ) -> ProvisionResult<()> {
        let description = self.tokens.parse_string(&set.description);
        let current = existing.map(|s| s.description.as_str()).unwrap_or("");
        if description != current {
            self.changes.set_description(NodeRef::Set(id), description);
        }

        if let Some(owner) = &set.owner {
            if let Some(owner) = self.check_principal(owner, PrincipalRole::Owner, name)? {
                if existing.and_then(|s| s.owner.as_deref()) != Some(owner.as_str()) {
                    self.changes.set_owner(NodeRef::Set(id), owner);
                }
            }
        }

        self.changes
            .set_open_for_term_creation(id, set.is_open_for_term_creation);
        self.changes
            .set_available_for_tagging(NodeRef::Set(id), set.is_available_for_tagging);

        for (key, value) in &set.custom_properties {
            let value = self.tokens.parse_string(value);
            self.changes.set_custom_property(id, key, value);
        }
        Ok(())
    }
}
