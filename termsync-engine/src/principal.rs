use crate::error::ProvisionResult;
use crate::provisioner::TaxonomyProvisioner;
use crate::report::{PrincipalRole, ProvisionWarning};
use tracing::warn;

impl TaxonomyProvisioner<'_> {
    /// Resolves tokens in a principal name and checks that it exists.
    ///
    /// Returns the resolved name, or `None` when the assignment must be
    /// skipped. A missing principal is recorded as a warning, not an error.
    pub(crate) fn check_principal(
        &mut self,
        principal: &str,
        role: PrincipalRole,
        target: &str,
    ) -> ProvisionResult<Option<String>> {
        let principal = self.tokens.parse_string(principal).trim().to_string();
        if principal.is_empty() {
            return Ok(None);
        }
        if self.directory.principal_exists(&principal)? {
            return Ok(Some(principal));
        }

        warn!(
            "Principal '{}' not found, skipping {} assignment on '{}'",
            principal, role, target
        );
        self.report.warnings.push(ProvisionWarning::PrincipalNotFound {
            principal,
            role,
            target: target.to_string(),
        });
        Ok(None)
    }
}
