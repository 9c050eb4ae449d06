//! In-process term store.
//!
//! Holds committed state in ordered maps and applies each commit
//! atomically: a batch that fails part-way leaves the store exactly as it
//! was after the previous commit. State can be saved to and loaded from a
//! JSON snapshot.

use crate::{
    normalize_name, ChangeSet, GroupInfo, LabelInfo, Mutation, NodeRef, ParentRef, SetInfo,
    StoreError, StoreResult, TermInfo, TermStore,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use termsync_types::{Lcid, TermStoreId};
use tracing::{debug, warn};

/// Name given to the site collection group of a fresh store.
pub const SITE_COLLECTION_GROUP_NAME: &str = "Site Collection";

/// Write counters since the store was created or loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Non-empty commits applied.
    pub commits: usize,
    /// Mutations that added a group, set, term or reuse link.
    pub creates: usize,
    /// All other applied mutations.
    pub updates: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    groups: BTreeMap<TermStoreId, GroupInfo>,
    sets: BTreeMap<TermStoreId, SetInfo>,
    terms: BTreeMap<TermStoreId, TermInfo>,
    /// Child term Ids per set or term, in creation order.
    children: BTreeMap<TermStoreId, Vec<TermStoreId>>,
}

/// A complete term store kept in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryTermStore {
    default_language: Lcid,
    site_collection_group: TermStoreId,
    state: StoreState,
    #[serde(skip)]
    stats: StoreStats,
    #[serde(skip)]
    pending_failure: Option<String>,
}

impl Default for MemoryTermStore {
    fn default() -> Self {
        Self::new(Lcid::default())
    }
}

impl MemoryTermStore {
    /// Creates an empty store holding only its site collection group.
    pub fn new(default_language: Lcid) -> Self {
        let site_id = TermStoreId::new();
        let mut state = StoreState::default();
        state.groups.insert(
            site_id,
            GroupInfo {
                id: site_id,
                name: SITE_COLLECTION_GROUP_NAME.to_string(),
                description: String::new(),
                contributors: Vec::new(),
                managers: Vec::new(),
                is_site_collection_group: true,
            },
        );
        Self {
            default_language,
            site_collection_group: site_id,
            state,
            stats: StoreStats::default(),
            pending_failure: None,
        }
    }

    /// Write counters.
    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = StoreStats::default();
    }

    /// Makes the next non-empty commit fail with a remote error.
    pub fn fail_next_commit(&mut self, reason: impl Into<String>) {
        self.pending_failure = Some(reason.into());
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupInfo> {
        self.state.groups.values()
    }

    pub fn sets(&self) -> impl Iterator<Item = &SetInfo> {
        self.state.sets.values()
    }

    pub fn terms(&self) -> impl Iterator<Item = &TermInfo> {
        self.state.terms.values()
    }

    /// Every term node whose name matches, reuse links included.
    pub fn terms_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a TermInfo> + use<'a> {
        let normalized = normalize_name(name);
        self.state
            .terms
            .values()
            .filter(move |t| t.name == normalized)
    }

    pub fn group_count(&self) -> usize {
        self.state.groups.len()
    }

    pub fn set_count(&self) -> usize {
        self.state.sets.len()
    }

    pub fn term_count(&self) -> usize {
        self.state.terms.len()
    }

    // ── Snapshots ────────────────────────────────────────────────

    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a snapshot written by [`MemoryTermStore::save`].
    pub fn load(path: &Path) -> StoreResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> StoreResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl TermStore for MemoryTermStore {
    fn default_language(&self) -> Lcid {
        self.default_language
    }

    fn group(&self, id: TermStoreId) -> StoreResult<Option<GroupInfo>> {
        Ok(self.state.groups.get(&id).cloned())
    }

    fn group_by_name(&self, normalized_name: &str) -> StoreResult<Option<GroupInfo>> {
        Ok(self
            .state
            .groups
            .values()
            .find(|g| g.name == normalized_name)
            .cloned())
    }

    fn site_collection_group(&self) -> StoreResult<GroupInfo> {
        self.state
            .groups
            .get(&self.site_collection_group)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("site collection group".to_string()))
    }

    fn term_set(&self, group: TermStoreId, id: TermStoreId) -> StoreResult<Option<SetInfo>> {
        Ok(self
            .state
            .sets
            .get(&id)
            .filter(|s| s.group_id == group)
            .cloned())
    }

    fn term_set_by_name(
        &self,
        group: TermStoreId,
        normalized_name: &str,
    ) -> StoreResult<Option<SetInfo>> {
        Ok(self
            .state
            .sets
            .values()
            .find(|s| s.group_id == group && s.name == normalized_name)
            .cloned())
    }

    fn term(&self, id: TermStoreId) -> StoreResult<Option<TermInfo>> {
        Ok(self.state.terms.get(&id).cloned())
    }

    fn child_terms(&self, parent: ParentRef) -> StoreResult<Vec<TermInfo>> {
        self.state.set_of(parent)?;
        Ok(self
            .state
            .children
            .get(&parent.id())
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.state.terms.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn contains_id(&self, id: TermStoreId) -> StoreResult<bool> {
        Ok(self.state.contains(id))
    }

    fn commit(&mut self, changes: &mut ChangeSet) -> StoreResult<()> {
        let mutations = changes.take();
        if mutations.is_empty() {
            return Ok(());
        }
        if let Some(reason) = self.pending_failure.take() {
            warn!("Rejecting batch of {} mutations: {}", mutations.len(), reason);
            return Err(StoreError::Remote(reason));
        }

        let mut next = self.state.clone();
        let mut stats = self.stats;
        for mutation in &mutations {
            next.apply(mutation)?;
            if mutation.is_create() {
                stats.creates += 1;
            } else {
                stats.updates += 1;
            }
        }
        stats.commits += 1;

        self.state = next;
        self.stats = stats;
        debug!("Committed batch of {} mutations", mutations.len());
        Ok(())
    }
}

impl StoreState {
    fn contains(&self, id: TermStoreId) -> bool {
        self.groups.contains_key(&id) || self.sets.contains_key(&id) || self.terms.contains_key(&id)
    }

    fn ensure_unused(&self, id: TermStoreId) -> StoreResult<()> {
        if self.contains(id) {
            return Err(StoreError::DuplicateId(id));
        }
        Ok(())
    }

    /// The set a child of `parent` belongs to.
    fn set_of(&self, parent: ParentRef) -> StoreResult<TermStoreId> {
        match parent {
            ParentRef::Set(id) if self.sets.contains_key(&id) => Ok(id),
            ParentRef::Term(id) => self
                .terms
                .get(&id)
                .map(|t| t.set_id)
                .ok_or_else(|| StoreError::NotFound(parent.to_string())),
            ParentRef::Set(_) => Err(StoreError::NotFound(parent.to_string())),
        }
    }

    fn group_mut(&mut self, id: TermStoreId) -> StoreResult<&mut GroupInfo> {
        self.groups
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(NodeRef::Group(id).to_string()))
    }

    fn set_mut(&mut self, id: TermStoreId) -> StoreResult<&mut SetInfo> {
        self.sets
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(NodeRef::Set(id).to_string()))
    }

    fn term_mut(&mut self, id: TermStoreId) -> StoreResult<&mut TermInfo> {
        self.terms
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(NodeRef::Term(id).to_string()))
    }

    fn insert_child(&mut self, parent: ParentRef, term: TermInfo) {
        self.children.entry(parent.id()).or_default().push(term.id);
        self.terms.insert(term.id, term);
    }

    fn apply(&mut self, mutation: &Mutation) -> StoreResult<()> {
        match mutation {
            Mutation::CreateGroup { id, name } => {
                self.ensure_unused(*id)?;
                self.groups.insert(
                    *id,
                    GroupInfo {
                        id: *id,
                        name: normalize_name(name),
                        description: String::new(),
                        contributors: Vec::new(),
                        managers: Vec::new(),
                        is_site_collection_group: false,
                    },
                );
            }
            Mutation::CreateSet {
                group,
                id,
                name,
                language,
            } => {
                if !self.groups.contains_key(group) {
                    return Err(StoreError::NotFound(NodeRef::Group(*group).to_string()));
                }
                self.ensure_unused(*id)?;
                self.sets.insert(
                    *id,
                    SetInfo {
                        id: *id,
                        group_id: *group,
                        name: normalize_name(name),
                        language: *language,
                        description: String::new(),
                        owner: None,
                        is_open_for_term_creation: false,
                        is_available_for_tagging: true,
                        custom_properties: BTreeMap::new(),
                        custom_sort_order: None,
                    },
                );
            }
            Mutation::CreateTerm {
                parent,
                id,
                name,
                language,
            } => {
                let set_id = self.set_of(*parent)?;
                self.ensure_unused(*id)?;
                let name = normalize_name(name);
                self.insert_child(
                    *parent,
                    TermInfo {
                        id: *id,
                        set_id,
                        parent: *parent,
                        name: name.clone(),
                        language: *language,
                        description: String::new(),
                        owner: None,
                        is_available_for_tagging: true,
                        is_deprecated: false,
                        labels: vec![LabelInfo {
                            value: name,
                            language: *language,
                            is_default_for_language: true,
                        }],
                        shared_properties: BTreeMap::new(),
                        local_properties: BTreeMap::new(),
                        custom_sort_order: None,
                        reused_from: None,
                        source_term: *id,
                    },
                );
            }
            Mutation::ReuseTerm {
                parent,
                id,
                source,
                copy_shared_data,
            } => {
                let set_id = self.set_of(*parent)?;
                self.ensure_unused(*id)?;
                let origin = self
                    .terms
                    .get(source)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound(NodeRef::Term(*source).to_string()))?;
                let (labels, shared_properties) = if *copy_shared_data {
                    (origin.labels.clone(), origin.shared_properties.clone())
                } else {
                    let name_label = LabelInfo {
                        value: origin.name.clone(),
                        language: origin.language,
                        is_default_for_language: true,
                    };
                    (vec![name_label], BTreeMap::new())
                };
                self.insert_child(
                    *parent,
                    TermInfo {
                        id: *id,
                        set_id,
                        parent: *parent,
                        name: origin.name,
                        language: origin.language,
                        description: origin.description,
                        owner: origin.owner,
                        is_available_for_tagging: origin.is_available_for_tagging,
                        is_deprecated: origin.is_deprecated,
                        labels,
                        shared_properties,
                        local_properties: BTreeMap::new(),
                        custom_sort_order: None,
                        reused_from: Some(*source),
                        source_term: origin.source_term,
                    },
                );
            }
            Mutation::ReassignSourceTerm { term, new_source } => {
                if !self.terms.contains_key(new_source) {
                    return Err(StoreError::NotFound(NodeRef::Term(*new_source).to_string()));
                }
                let family = self.term_mut(*term)?.source_term;
                for node in self.terms.values_mut() {
                    if node.source_term == family || node.id == *term {
                        node.source_term = *new_source;
                    }
                }
            }
            Mutation::SetName { target, name } => {
                let name = normalize_name(name);
                match target {
                    NodeRef::Group(id) => self.group_mut(*id)?.name = name,
                    NodeRef::Set(id) => self.set_mut(*id)?.name = name,
                    NodeRef::Term(id) => {
                        let term = self.term_mut(*id)?;
                        let language = term.language;
                        let old = std::mem::replace(&mut term.name, name.clone());
                        if let Some(label) = term
                            .labels
                            .iter_mut()
                            .find(|l| l.language == language && l.value == old)
                        {
                            label.value = name;
                        }
                    }
                }
            }
            Mutation::SetDescription {
                target,
                description,
            } => match target {
                NodeRef::Group(id) => self.group_mut(*id)?.description = description.clone(),
                NodeRef::Set(id) => self.set_mut(*id)?.description = description.clone(),
                NodeRef::Term(id) => self.term_mut(*id)?.description = description.clone(),
            },
            Mutation::SetOwner { target, owner } => match target {
                NodeRef::Set(id) => self.set_mut(*id)?.owner = Some(owner.clone()),
                NodeRef::Term(id) => self.term_mut(*id)?.owner = Some(owner.clone()),
                NodeRef::Group(_) => {
                    return Err(StoreError::InvalidMutation(format!(
                        "{target} has no owner"
                    )));
                }
            },
            Mutation::AddContributor { group, principal } => {
                let group = self.group_mut(*group)?;
                if !group.has_contributor(principal) {
                    group.contributors.push(principal.clone());
                }
            }
            Mutation::AddManager { group, principal } => {
                let group = self.group_mut(*group)?;
                if !group.has_manager(principal) {
                    group.managers.push(principal.clone());
                }
            }
            Mutation::SetAvailableForTagging { target, value } => match target {
                NodeRef::Set(id) => self.set_mut(*id)?.is_available_for_tagging = *value,
                NodeRef::Term(id) => self.term_mut(*id)?.is_available_for_tagging = *value,
                NodeRef::Group(_) => {
                    return Err(StoreError::InvalidMutation(format!(
                        "{target} cannot be tagged"
                    )));
                }
            },
            Mutation::SetOpenForTermCreation { set, value } => {
                self.set_mut(*set)?.is_open_for_term_creation = *value;
            }
            Mutation::SetCustomProperty { set, key, value } => {
                self.set_mut(*set)?
                    .custom_properties
                    .insert(key.clone(), value.clone());
            }
            Mutation::SetSharedProperty { term, key, value } => {
                self.term_mut(*term)?
                    .shared_properties
                    .insert(key.clone(), value.clone());
            }
            Mutation::SetLocalProperty { term, key, value } => {
                self.term_mut(*term)?
                    .local_properties
                    .insert(key.clone(), value.clone());
            }
            Mutation::CreateLabel {
                term,
                value,
                language,
                is_default,
            } => {
                let term = self.term_mut(*term)?;
                if term.label(value, *language).is_some() {
                    return Err(StoreError::InvalidMutation(format!(
                        "label '{value}' ({language}) already exists on term {}",
                        term.id
                    )));
                }
                if *is_default {
                    for label in term.labels.iter_mut().filter(|l| l.language == *language) {
                        label.is_default_for_language = false;
                    }
                }
                term.labels.push(LabelInfo {
                    value: value.clone(),
                    language: *language,
                    is_default_for_language: *is_default,
                });
            }
            Mutation::SetDefaultLabel {
                term,
                value,
                language,
            } => {
                let term = self.term_mut(*term)?;
                if term.label(value, *language).is_none() {
                    return Err(StoreError::NotFound(format!(
                        "label '{value}' ({language}) on term {}",
                        term.id
                    )));
                }
                for label in term.labels.iter_mut().filter(|l| l.language == *language) {
                    label.is_default_for_language = label.value == *value;
                }
                if term.language == *language {
                    term.name = value.clone();
                }
            }
            Mutation::Deprecate { term, deprecated } => {
                self.term_mut(*term)?.is_deprecated = *deprecated;
            }
            Mutation::SetCustomSortOrder { target, order } => match target {
                ParentRef::Set(id) => self.set_mut(*id)?.custom_sort_order = Some(order.clone()),
                ParentRef::Term(id) => {
                    self.term_mut(*id)?.custom_sort_order = Some(order.clone())
                }
            },
        }
        Ok(())
    }
}
