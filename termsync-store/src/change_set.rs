//! Staged mutations.
//!
//! A [`ChangeSet`] is the client-side queue of writes accumulated between
//! two commits. The engine threads one change set through its calls and
//! flushes it explicitly; nothing in it is visible to reads until then.

use serde::{Deserialize, Serialize};
use std::fmt;
use termsync_types::{Lcid, TermStoreId};

/// Any addressable node of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NodeRef {
    Group(TermStoreId),
    Set(TermStoreId),
    Term(TermStoreId),
}

impl NodeRef {
    pub fn id(&self) -> TermStoreId {
        match self {
            NodeRef::Group(id) | NodeRef::Set(id) | NodeRef::Term(id) => *id,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Group(id) => write!(f, "group {id}"),
            NodeRef::Set(id) => write!(f, "set {id}"),
            NodeRef::Term(id) => write!(f, "term {id}"),
        }
    }
}

/// A node that can hold child terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ParentRef {
    Set(TermStoreId),
    Term(TermStoreId),
}

impl ParentRef {
    pub fn id(&self) -> TermStoreId {
        match self {
            ParentRef::Set(id) | ParentRef::Term(id) => *id,
        }
    }
}

impl From<ParentRef> for NodeRef {
    fn from(parent: ParentRef) -> Self {
        match parent {
            ParentRef::Set(id) => NodeRef::Set(id),
            ParentRef::Term(id) => NodeRef::Term(id),
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        NodeRef::from(*self).fmt(f)
    }
}

/// One staged write against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateGroup {
        id: TermStoreId,
        name: String,
    },
    CreateSet {
        group: TermStoreId,
        id: TermStoreId,
        name: String,
        language: Lcid,
    },
    CreateTerm {
        parent: ParentRef,
        id: TermStoreId,
        name: String,
        language: Lcid,
    },
    /// Creates a link node `id` under `parent` for the existing term `source`.
    ReuseTerm {
        parent: ParentRef,
        id: TermStoreId,
        source: TermStoreId,
        copy_shared_data: bool,
    },
    /// Makes `new_source` the canonical copy of `term`'s reuse family.
    ReassignSourceTerm {
        term: TermStoreId,
        new_source: TermStoreId,
    },
    SetName {
        target: NodeRef,
        name: String,
    },
    SetDescription {
        target: NodeRef,
        description: String,
    },
    SetOwner {
        target: NodeRef,
        owner: String,
    },
    AddContributor {
        group: TermStoreId,
        principal: String,
    },
    AddManager {
        group: TermStoreId,
        principal: String,
    },
    SetAvailableForTagging {
        target: NodeRef,
        value: bool,
    },
    SetOpenForTermCreation {
        set: TermStoreId,
        value: bool,
    },
    SetCustomProperty {
        set: TermStoreId,
        key: String,
        value: String,
    },
    SetSharedProperty {
        term: TermStoreId,
        key: String,
        value: String,
    },
    SetLocalProperty {
        term: TermStoreId,
        key: String,
        value: String,
    },
    CreateLabel {
        term: TermStoreId,
        value: String,
        language: Lcid,
        is_default: bool,
    },
    SetDefaultLabel {
        term: TermStoreId,
        value: String,
        language: Lcid,
    },
    Deprecate {
        term: TermStoreId,
        deprecated: bool,
    },
    SetCustomSortOrder {
        target: ParentRef,
        order: String,
    },
}

impl Mutation {
    /// Whether this mutation adds a node to the store.
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            Mutation::CreateGroup { .. }
                | Mutation::CreateSet { .. }
                | Mutation::CreateTerm { .. }
                | Mutation::ReuseTerm { .. }
        )
    }
}

/// Pending mutations accumulated since the previous commit.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    mutations: Vec<Mutation>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.mutations.iter()
    }

    /// Takes every staged mutation, leaving the set empty.
    pub fn take(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    // ── Staging helpers ──────────────────────────────────────────

    pub fn create_group(&mut self, id: TermStoreId, name: impl Into<String>) {
        self.push(Mutation::CreateGroup { id, name: name.into() });
    }

    pub fn create_set(
        &mut self,
        group: TermStoreId,
        id: TermStoreId,
        name: impl Into<String>,
        language: Lcid,
    ) {
        self.push(Mutation::CreateSet {
            group,
            id,
            name: name.into(),
            language,
        });
    }

    pub fn create_child_term(
        &mut self,
        parent: ParentRef,
        id: TermStoreId,
        name: impl Into<String>,
        language: Lcid,
    ) {
        self.push(Mutation::CreateTerm {
            parent,
            id,
            name: name.into(),
            language,
        });
    }

    pub fn reuse_term(
        &mut self,
        parent: ParentRef,
        id: TermStoreId,
        source: TermStoreId,
        copy_shared_data: bool,
    ) {
        self.push(Mutation::ReuseTerm {
            parent,
            id,
            source,
            copy_shared_data,
        });
    }

    pub fn reassign_source_term(&mut self, term: TermStoreId, new_source: TermStoreId) {
        self.push(Mutation::ReassignSourceTerm { term, new_source });
    }

    pub fn set_name(&mut self, target: NodeRef, name: impl Into<String>) {
        self.push(Mutation::SetName { target, name: name.into() });
    }

    pub fn set_description(&mut self, target: NodeRef, description: impl Into<String>) {
        self.push(Mutation::SetDescription {
            target,
            description: description.into(),
        });
    }

    pub fn set_owner(&mut self, target: NodeRef, owner: impl Into<String>) {
        self.push(Mutation::SetOwner { target, owner: owner.into() });
    }

    pub fn add_contributor(&mut self, group: TermStoreId, principal: impl Into<String>) {
        self.push(Mutation::AddContributor {
            group,
            principal: principal.into(),
        });
    }

    pub fn add_manager(&mut self, group: TermStoreId, principal: impl Into<String>) {
        self.push(Mutation::AddManager {
            group,
            principal: principal.into(),
        });
    }

    pub fn set_available_for_tagging(&mut self, target: NodeRef, value: bool) {
        self.push(Mutation::SetAvailableForTagging { target, value });
    }

    pub fn set_open_for_term_creation(&mut self, set: TermStoreId, value: bool) {
        self.push(Mutation::SetOpenForTermCreation { set, value });
    }

    pub fn set_custom_property(
        &mut self,
        set: TermStoreId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.push(Mutation::SetCustomProperty {
            set,
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn set_shared_property(
        &mut self,
        term: TermStoreId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.push(Mutation::SetSharedProperty {
            term,
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn set_local_property(
        &mut self,
        term: TermStoreId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.push(Mutation::SetLocalProperty {
            term,
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn create_label(
        &mut self,
        term: TermStoreId,
        value: impl Into<String>,
        language: Lcid,
        is_default: bool,
    ) {
        self.push(Mutation::CreateLabel {
            term,
            value: value.into(),
            language,
            is_default,
        });
    }

    pub fn set_default_label(&mut self, term: TermStoreId, value: impl Into<String>, language: Lcid) {
        self.push(Mutation::SetDefaultLabel {
            term,
            value: value.into(),
            language,
        });
    }

    pub fn deprecate(&mut self, term: TermStoreId, deprecated: bool) {
        self.push(Mutation::Deprecate { term, deprecated });
    }

    pub fn set_custom_sort_order(&mut self, target: ParentRef, order: impl Into<String>) {
        self.push(Mutation::SetCustomSortOrder {
            target,
            order: order.into(),
        });
    }
}
