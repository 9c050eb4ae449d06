//! Committed-state snapshots returned by store reads.

use crate::ParentRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use termsync_types::{Lcid, TermStoreId};

/// A remote term group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: TermStoreId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contributors: Vec<String>,
    #[serde(default)]
    pub managers: Vec<String>,
    #[serde(default)]
    pub is_site_collection_group: bool,
}

impl GroupInfo {
    pub fn has_contributor(&self, principal: &str) -> bool {
        self.contributors.iter().any(|p| p.eq_ignore_ascii_case(principal))
    }

    pub fn has_manager(&self, principal: &str) -> bool {
        self.managers.iter().any(|p| p.eq_ignore_ascii_case(principal))
    }
}

/// A remote term set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetInfo {
    pub id: TermStoreId,
    pub group_id: TermStoreId,
    pub name: String,
    pub language: Lcid,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: Option<String>,
    pub is_open_for_term_creation: bool,
    pub is_available_for_tagging: bool,
    #[serde(default)]
    pub custom_properties: BTreeMap<String, String>,
    /// Explicit child ordering: child Ids joined by `:`.
    #[serde(default)]
    pub custom_sort_order: Option<String>,
}

/// A label stored on a remote term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelInfo {
    pub value: String,
    pub language: Lcid,
    pub is_default_for_language: bool,
}

/// A remote term node.
///
/// Reuse links are nodes of their own: `reused_from` names the node the
/// link was created from and `source_term` points at the canonical copy of
/// the reuse family (the node itself for a term that was never reused).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermInfo {
    pub id: TermStoreId,
    pub set_id: TermStoreId,
    pub parent: ParentRef,
    pub name: String,
    /// Language the term was created in; its name is the default label here.
    pub language: Lcid,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: Option<String>,
    pub is_available_for_tagging: bool,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub labels: Vec<LabelInfo>,
    #[serde(default)]
    pub shared_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub local_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_sort_order: Option<String>,
    #[serde(default)]
    pub reused_from: Option<TermStoreId>,
    pub source_term: TermStoreId,
}

impl TermInfo {
    /// Whether this node is a reuse link.
    pub fn is_reused(&self) -> bool {
        self.reused_from.is_some()
    }

    /// Whether this node is the canonical copy of its reuse family.
    pub fn is_source_term(&self) -> bool {
        self.source_term == self.id
    }

    /// The label with this exact value and language, if any.
    pub fn label(&self, value: &str, language: Lcid) -> Option<&LabelInfo> {
        self.labels
            .iter()
            .find(|l| l.language == language && l.value == value)
    }

    /// The default label for a language, if any.
    pub fn default_label(&self, language: Lcid) -> Option<&LabelInfo> {
        self.labels
            .iter()
            .find(|l| l.language == language && l.is_default_for_language)
    }
}
