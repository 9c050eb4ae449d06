//! Group resolver.

use crate::error::ProvisionResult;
use crate::provisioner::TaxonomyProvisioner;
use crate::report::PrincipalRole;
use crate::reuse::DeferredReuse;
use crate::tokens::TaxonomyToken;
use termsync_model::{TermGroup, UpdateBehavior};
use termsync_store::{GroupInfo, NodeRef};
use termsync_types::TermStoreId;
use tracing::{debug, info};

impl TaxonomyProvisioner<'_> {
    /// Resolves one group, then walks its sets.
    pub(crate) fn provision_group<'m>(
        &mut self,
        group: &'m mut TermGroup,
        deferred: &mut Vec<DeferredReuse<'m>>,
    ) -> ProvisionResult<()> {
        let behavior = group
            .update_behavior
            .unwrap_or(self.config.default_update_behavior);
        let info = self.resolve_group(group, behavior)?;

        for set in group.sets.iter_mut() {
            self.provision_set(set, &info, behavior, deferred)?;
        }
        Ok(())
    }

    /// Finds, creates or updates the remote group for `group`, commits, and
    /// returns the reloaded group. The resolved Id is written back.
    pub fn resolve_group(
        &mut self,
        group: &mut TermGroup,
        behavior: UpdateBehavior,
    ) -> ProvisionResult<GroupInfo> {
        let name = self.tokens.parse_string(&group.name);
        let normalized = self.store.normalize_name(&name);

        let site_scoped = group.site_collection_term_group
            || self.config.is_site_collection_sentinel(&group.name)
            || self.config.is_site_collection_sentinel(&normalized);

        let existing = if site_scoped {
            debug!("Group '{}' resolves to the site collection group", group.name);
            Some(self.store.site_collection_group()?)
        } else {
            self.find_group(group.id, &name, &normalized)?
        };

        let (id, existing) = match existing {
            Some(info) => (info.id, Some(info)),
            None => (self.new_node_id(group.id, &name)?, None),
        };
        self.claim(id, &name)?;

        match existing {
            Some(info) => {
                if behavior == UpdateBehavior::Overwrite {
                    debug!("Updating group '{}' ({})", info.name, id);
                    self.stage_group_fields(id, group, Some(&info), &name)?;
                    self.report.groups_updated += 1;
                }
            }
            None => {
                info!("Creating group '{}' ({})", name, id);
                self.changes.create_group(id, &name);
                self.stage_group_fields(id, group, None, &name)?;
                self.report.groups_created += 1;
            }
        }

        group.id = Some(id);
        self.flush()?;
        let info = self.reload_group(id)?;
        self.tokens.add_token(TaxonomyToken::Group {
            name: info.name.clone(),
            id,
        });
        Ok(info)
    }

    fn find_group(
        &self,
        id: Option<TermStoreId>,
        name: &str,
        normalized: &str,
    ) -> ProvisionResult<Option<GroupInfo>> {
        if let Some(id) = id {
            if let Some(info) = self.store.group(id)? {
                return Ok(Some(info));
            }
        }
        self.reject_foreign_id(id, name)?;
        Ok(self.store.group_by_name(normalized)?)
    }

    fn stage_group_fields(
        &mut self,
        id: TermStoreId,
        group: &TermGroup,
        existing: Option<&GroupInfo>,
        name: &str,
    ) -> ProvisionResult<()> {
        let description = self.tokens.parse_string(&group.description);
        let current = existing.map(|g| g.description.as_str()).unwrap_or("");
        if description != current {
            self.changes.set_description(NodeRef::Group(id), description);
        }

        for contributor in &group.contributors {
            let principal = self.tokens.parse_string(contributor);
            if existing.is_some_and(|g| g.has_contributor(principal.trim())) {
                continue;
            }
            if let Some(principal) =
                self.check_principal(&principal, PrincipalRole::Contributor, name)?
            {
                self.changes.add_contributor(id, principal);
            }
        }

        for manager in &group.managers {
            let principal = self.tokens.parse_string(manager);
            if existing.is_some_and(|g| g.has_manager(principal.trim())) {
                continue;
            }
            if let Some(principal) = self.check_principal(&principal, PrincipalRole::Manager, name)? {
                self.changes.add_manager(id, principal);
            }
        }
        Ok(())
    }
}
