use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use termsync_engine::{
    PrincipalRole, ProvisionConfig, ProvisionError, ProvisionReport, ProvisionResult,
    ProvisionWarning, TaxonomyProvisioner, TokenRegistry,
};
use termsync_model::{TaxonomyModel, TermGroup, TermSet, UpdateBehavior};
use termsync_store::{
    ChangeSet, MemoryDirectory, MemoryTermStore, NodeRef, OpenDirectory, ParentRef,
    PrincipalDirectory, SetInfo, TermStore,
};
use termsync_types::{Lcid, TermStoreId};

const GERMAN: Lcid = Lcid::new(1031);

fn make_store() -> MemoryTermStore {
    MemoryTermStore::new(Lcid::EN_US)
}

fn provision_with(
    store: &mut MemoryTermStore,
    directory: &dyn PrincipalDirectory,
    model: &mut TaxonomyModel,
) -> ProvisionResult<ProvisionReport> {
    let mut tokens = TokenRegistry::new();
    TaxonomyProvisioner::new(store, directory, &mut tokens, ProvisionConfig::default())
        .provision(model)
}

fn provision(store: &mut MemoryTermStore, model: &mut TaxonomyModel) -> ProvisionResult<ProvisionReport> {
    provision_with(store, &OpenDirectory, model)
}

fn make_model(set: TermSet) -> TaxonomyModel {
    TaxonomyModel::new(vec![TermGroup::new("Projects").with_set(set)])
}

fn load_set(store: &MemoryTermStore, model: &TaxonomyModel) -> SetInfo {
    let group = model.groups[0].id.unwrap();
    let set = model.groups[0].sets[0].id.unwrap();
    store.term_set(group, set).unwrap().unwrap()
}

/// Creates group "Projects" holding set "Marketing" directly in the store.
fn seed_marketing(store: &mut MemoryTermStore) -> (TermStoreId, TermStoreId) {
    let (group, set) = (TermStoreId::new(), TermStoreId::new());
    let mut changes = ChangeSet::new();
    changes.create_group(group, "Projects");
    changes.create_set(group, set, "Marketing", Lcid::EN_US);
    changes.set_description(NodeRef::Set(set), "Seeded");
    store.commit(&mut changes).unwrap();
    (group, set)
}

// ── Create ───────────────────────────────────────────────────────

#[test]
fn new_set_uses_store_default_language() {
    let mut store = MemoryTermStore::new(GERMAN);
    let mut model = make_model(TermSet::new("Marketing"));

    let report = provision(&mut store, &mut model).unwrap();

    assert_eq!(report.sets_created, 1);
    assert_eq!(load_set(&store, &model).language, GERMAN);
}

#[test]
fn new_set_writes_all_fields() {
    let mut store = make_store();
    let mut set = TermSet::new("Marketing")
        .with_language(Lcid::EN_US)
        .with_custom_property("Department", "Sales")
        .with_custom_property("Region", "EMEA");
    set.description = "Campaign terms".to_string();
    set.owner = Some("alice@contoso.com".to_string());
    set.is_open_for_term_creation = true;
    set.is_available_for_tagging = false;
    let mut model = make_model(set);

    provision(&mut store, &mut model).unwrap();

    let info = load_set(&store, &model);
    assert_eq!(info.name, "Marketing");
    assert_eq!(info.description, "Campaign terms");
    assert_eq!(info.owner.as_deref(), Some("alice@contoso.com"));
    assert!(info.is_open_for_term_creation);
    assert!(!info.is_available_for_tagging);
    assert_eq!(
        info.custom_properties,
        BTreeMap::from([
            ("Department".to_string(), "Sales".to_string()),
            ("Region".to_string(), "EMEA".to_string()),
        ])
    );
}

#[test]
fn unknown_owner_is_skipped_with_warning() {
    let mut store = make_store();
    let directory = MemoryDirectory::new(["alice@contoso.com"]);
    let mut set = TermSet::new("Marketing");
    set.owner = Some("ghost@contoso.com".to_string());
    let mut model = make_model(set);

    let report = provision_with(&mut store, &directory, &mut model).unwrap();

    assert_eq!(load_set(&store, &model).owner, None);
    assert_eq!(
        report.warnings,
        vec![ProvisionWarning::PrincipalNotFound {
            principal: "ghost@contoso.com".to_string(),
            role: PrincipalRole::Owner,
            target: "Marketing".to_string(),
        }]
    );
}

// ── Match ────────────────────────────────────────────────────────

#[test]
fn add_only_leaves_existing_set_untouched() {
    let mut store = make_store();
    let (group, set) = seed_marketing(&mut store);
    store.reset_stats();

    let mut model_set = TermSet::new("Marketing");
    model_set.description = "Changed".to_string();
    model_set.is_open_for_term_creation = true;
    let mut model = make_model(model_set);
    let report = provision(&mut store, &mut model).unwrap();

    assert_eq!(model.groups[0].id, Some(group));
    assert_eq!(model.groups[0].sets[0].id, Some(set));
    assert_eq!(report.sets_updated, 0);
    assert_eq!(store.stats().commits, 0);
    let info = load_set(&store, &model);
    assert_eq!(info.description, "Seeded");
    assert!(!info.is_open_for_term_creation);
}

#[test]
fn overwrite_rewrites_flags_and_description() {
    let mut store = make_store();
    seed_marketing(&mut store);

    let mut model_set = TermSet::new("Marketing").with_custom_property("Department", "Sales");
    model_set.description = "Changed".to_string();
    model_set.is_open_for_term_creation = true;
    let mut model = TaxonomyModel::new(vec![
        TermGroup::new("Projects")
            .with_update_behavior(UpdateBehavior::Overwrite)
            .with_set(model_set),
    ]);
    let report = provision(&mut store, &mut model).unwrap();

    assert_eq!(report.sets_updated, 1);
    assert_eq!(report.sets_created, 0);
    let info = load_set(&store, &model);
    assert_eq!(info.description, "Changed");
    assert!(info.is_open_for_term_creation);
    assert_eq!(info.custom_properties.get("Department").map(String::as_str), Some("Sales"));
}

#[test]
fn set_matched_by_id_within_group() {
    let mut store = make_store();
    let (_, set) = seed_marketing(&mut store);

    let mut model = make_model(TermSet::new("Campaigns").with_id(set));
    provision(&mut store, &mut model).unwrap();

    assert_eq!(model.groups[0].sets[0].id, Some(set));
    assert_eq!(store.set_count(), 1);
}

#[test]
fn same_set_name_in_different_groups_creates_two_sets() {
    let mut store = make_store();
    let mut model = TaxonomyModel::new(vec![
        TermGroup::new("Projects").with_set(TermSet::new("Archive")),
        TermGroup::new("Clients").with_set(TermSet::new("Archive")),
    ]);

    let report = provision(&mut store, &mut model).unwrap();

    assert_eq!(report.sets_created, 2);
    assert_ne!(model.groups[0].sets[0].id, model.groups[1].sets[0].id);
}

// ── Preconditions ────────────────────────────────────────────────

#[test]
fn explicit_id_of_a_term_is_not_masked_by_a_set_name_match() {
    let mut store = make_store();
    let (_, marketing) = seed_marketing(&mut store);
    let cloud = TermStoreId::new();
    let mut changes = ChangeSet::new();
    changes.create_child_term(ParentRef::Set(marketing), cloud, "Cloud", Lcid::EN_US);
    store.commit(&mut changes).unwrap();

    let mut model = make_model(TermSet::new("Marketing").with_id(cloud));
    store.reset_stats();
    let err = provision(&mut store, &mut model).unwrap_err();

    assert!(matches!(err, ProvisionError::PreconditionViolation { id, .. } if id == cloud));
    assert_eq!(store.stats().commits, 0);
    assert_eq!(model.groups[0].sets[0].id, Some(cloud));
}
