use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use termsync_types::{Lcid, TermStoreId};

/// A language-specific display value for a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermLabel {
    pub value: String,
    pub language: Lcid,
    #[serde(default)]
    pub is_default_for_language: bool,
}

impl TermLabel {
    pub fn new(value: impl Into<String>, language: Lcid, is_default_for_language: bool) -> Self {
        Self {
            value: value.into(),
            language,
            is_default_for_language,
        }
    }
}

/// A node in a term set's tree.
///
/// A reused term (`is_reused`) is a link to a canonical term elsewhere in
/// the store, referenced by `id`. Labels and shared properties belong to the
/// canonical term and are only pushed onto a reused copy when that copy is
/// the source (`is_source_term`). Local properties always apply to the node
/// they are declared on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TermStoreId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Lcid>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default = "crate::default_true")]
    pub is_available_for_tagging: bool,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub labels: Vec<TermLabel>,
    #[serde(default)]
    pub shared_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub local_properties: BTreeMap<String, String>,
    /// Rank among siblings; 0 leaves the term to the store's default order.
    #[serde(default)]
    pub custom_sort_order: u32,
    #[serde(default)]
    pub is_reused: bool,
    #[serde(default)]
    pub is_source_term: bool,
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl Default for Term {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            language: None,
            description: String::new(),
            owner: None,
            is_available_for_tagging: true,
            is_deprecated: false,
            labels: Vec::new(),
            shared_properties: BTreeMap::new(),
            local_properties: BTreeMap::new(),
            custom_sort_order: 0,
            is_reused: false,
            is_source_term: false,
            terms: Vec::new(),
        }
    }
}

impl Term {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A reused copy of the term identified by `source`.
    pub fn reusing(name: impl Into<String>, source: TermStoreId) -> Self {
        Self {
            name: name.into(),
            id: Some(source),
            is_reused: true,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: TermStoreId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_label(mut self, label: TermLabel) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_shared_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.shared_properties.insert(key.into(), value.into());
        self
    }

    pub fn with_local_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.local_properties.insert(key.into(), value.into());
        self
    }

    pub fn with_sort_order(mut self, rank: u32) -> Self {
        self.custom_sort_order = rank;
        self
    }

    pub fn with_child(mut self, child: Term) -> Self {
        self.terms.push(child);
        self
    }

    /// Marks a reused term as the new canonical source.
    pub fn as_source_term(mut self) -> Self {
        self.is_source_term = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.is_deprecated = true;
        self
    }

    /// Whether the first pass always leaves this term for the reuse pass.
    /// Source terms are deferred only when their Id already exists.
    pub fn is_deferred_reuse(&self) -> bool {
        self.is_reused && !self.is_source_term
    }

    /// Depth-first iterator over this term and all of its descendants.
    pub fn descendants(&self) -> impl Iterator<Item = &Term> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.terms.iter().rev());
            Some(next)
        })
    }
}
