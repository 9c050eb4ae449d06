//! Run report: counters, recovered warnings and unresolved reuse entries.

use serde::Serialize;
use std::fmt;
use termsync_store::ParentRef;
use termsync_types::{Lcid, TermStoreId};

/// Which assignment a principal was meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalRole {
    Owner,
    Contributor,
    Manager,
}

impl fmt::Display for PrincipalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalRole::Owner => f.write_str("owner"),
            PrincipalRole::Contributor => f.write_str("contributor"),
            PrincipalRole::Manager => f.write_str("manager"),
        }
    }
}

/// A condition the engine recovered from by skipping one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProvisionWarning {
    PrincipalNotFound {
        principal: String,
        role: PrincipalRole,
        target: String,
    },
    LabelLanguagePolicy {
        term: String,
        label: String,
        language: Lcid,
    },
    /// A reused term without an Id cannot reference its source.
    ReuseWithoutId { term: String },
}

impl fmt::Display for ProvisionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionWarning::PrincipalNotFound {
                principal,
                role,
                target,
            } => write!(f, "{role} '{principal}' of '{target}' not found"),
            ProvisionWarning::LabelLanguagePolicy {
                term,
                label,
                language,
            } => write!(
                f,
                "label '{label}' cannot become the default for {language} on '{term}'"
            ),
            ProvisionWarning::ReuseWithoutId { term } => {
                write!(f, "reused term '{term}' has no source id")
            }
        }
    }
}

/// Result of resolving one deferred reused term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReuseOutcome {
    /// The referenced source Id from the model.
    pub term_id: Option<TermStoreId>,
    pub term_name: String,
    pub parent: ParentRef,
    /// The link node, when one was created or already present.
    pub link_id: Option<TermStoreId>,
    pub success: bool,
}

impl ReuseOutcome {
    pub(crate) fn resolved(
        term_id: TermStoreId,
        term_name: String,
        parent: ParentRef,
        link_id: TermStoreId,
    ) -> Self {
        Self {
            term_id: Some(term_id),
            term_name,
            parent,
            link_id: Some(link_id),
            success: true,
        }
    }

    pub(crate) fn unresolved(
        term_id: Option<TermStoreId>,
        term_name: String,
        parent: ParentRef,
    ) -> Self {
        Self {
            term_id,
            term_name,
            parent,
            link_id: None,
            success: false,
        }
    }
}

/// Summary of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub groups_created: usize,
    pub groups_updated: usize,
    pub sets_created: usize,
    pub sets_updated: usize,
    pub terms_created: usize,
    pub terms_updated: usize,
    pub reuse_links_created: usize,
    pub warnings: Vec<ProvisionWarning>,
    /// Reuse entries whose source was not available; nothing was created
    /// for them.
    pub unresolved_reuse: Vec<ReuseOutcome>,
}

impl ProvisionReport {
    /// Nodes added to the store, reuse links included.
    pub fn created(&self) -> usize {
        self.groups_created + self.sets_created + self.terms_created + self.reuse_links_created
    }

    /// No warnings and nothing left unresolved.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.unresolved_reuse.is_empty()
    }
}
