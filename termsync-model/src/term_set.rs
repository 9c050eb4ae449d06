use crate::Term;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use termsync_types::{Lcid, TermStoreId};

/// A named collection of terms within a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TermStoreId>,
    pub name: String,
    /// Falls back to the store's default language when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Lcid>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub is_open_for_term_creation: bool,
    #[serde(default = "crate::default_true")]
    pub is_available_for_tagging: bool,
    #[serde(default)]
    pub custom_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl Default for TermSet {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            language: None,
            description: String::new(),
            owner: None,
            is_open_for_term_creation: false,
            is_available_for_tagging: true,
            custom_properties: BTreeMap::new(),
            terms: Vec::new(),
        }
    }
}

impl TermSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: TermStoreId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_language(mut self, language: Lcid) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    pub fn with_custom_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_properties.insert(key.into(), value.into());
        self
    }
}
