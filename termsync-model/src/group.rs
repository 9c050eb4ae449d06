use crate::TermSet;
use serde::{Deserialize, Serialize};
use termsync_types::TermStoreId;

/// Whether matched remote nodes are left alone or reconciled to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateBehavior {
    /// Existing nodes keep their remote state; only their Ids are copied
    /// back onto the model.
    #[default]
    AddOnly,
    /// Existing nodes have their fields updated to match the model.
    Overwrite,
}

/// Root of a declarative taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyModel {
    #[serde(default)]
    pub groups: Vec<TermGroup>,
}

impl TaxonomyModel {
    pub fn new(groups: Vec<TermGroup>) -> Self {
        Self { groups }
    }

    /// Parses a model from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the model (including any Ids filled in by a run).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A top-level term group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TermStoreId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contributors: Vec<String>,
    #[serde(default)]
    pub managers: Vec<String>,
    #[serde(default)]
    pub sets: Vec<TermSet>,
    /// Marks the one-per-site group instead of a named global group.
    #[serde(default)]
    pub site_collection_term_group: bool,
    /// `None` falls back to the provisioner's configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_behavior: Option<UpdateBehavior>,
}

impl TermGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: assigns an explicit Id.
    pub fn with_id(mut self, id: TermStoreId) -> Self {
        self.id = Some(id);
        self
    }

    /// Builder: appends a set.
    pub fn with_set(mut self, set: TermSet) -> Self {
        self.sets.push(set);
        self
    }

    /// Builder: sets the update behavior for this group's subtree.
    pub fn with_update_behavior(mut self, behavior: UpdateBehavior) -> Self {
        self.update_behavior = Some(behavior);
        self
    }

    /// The site-scoped group, resolved to the store's singleton.
    pub fn site_collection() -> Self {
        Self {
            site_collection_term_group: true,
            ..Default::default()
        }
    }
}
