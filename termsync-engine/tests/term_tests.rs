use pretty_assertions::assert_eq;
use termsync_engine::{
    ProvisionConfig, ProvisionError, ProvisionReport, ProvisionResult, TaxonomyProvisioner,
    TokenRegistry,
};
use termsync_model::{TaxonomyModel, Term, TermGroup, TermSet, UpdateBehavior};
use termsync_store::{MemoryTermStore, OpenDirectory, ParentRef, TermStore};
use termsync_types::{Lcid, TermStoreId};

fn make_store() -> MemoryTermStore {
    MemoryTermStore::new(Lcid::EN_US)
}

fn make_model(behavior: UpdateBehavior, terms: Vec<Term>) -> TaxonomyModel {
    let mut set = TermSet::new("Marketing");
    set.terms = terms;
    TaxonomyModel::new(vec![
        TermGroup::new("Projects")
            .with_update_behavior(behavior)
            .with_set(set),
    ])
}

fn provision(store: &mut MemoryTermStore, model: &mut TaxonomyModel) -> ProvisionResult<ProvisionReport> {
    let mut tokens = TokenRegistry::new();
    TaxonomyProvisioner::new(store, &OpenDirectory, &mut tokens, ProvisionConfig::default())
        .provision(model)
}

fn set_id(model: &TaxonomyModel) -> TermStoreId {
    model.groups[0].sets[0].id.unwrap()
}

fn term_names(store: &MemoryTermStore, parent: ParentRef) -> Vec<String> {
    store
        .child_terms(parent)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect()
}

// ── Create ───────────────────────────────────────────────────────

#[test]
fn creates_nested_terms_and_writes_ids_back() {
    let mut store = make_store();
    let mut model = make_model(
        UpdateBehavior::AddOnly,
        vec![
            Term::new("Cloud")
                .with_child(Term::new("Azure"))
                .with_child(Term::new("AWS")),
            Term::new("Mobile"),
        ],
    );

    let report = provision(&mut store, &mut model).unwrap();

    assert_eq!(report.terms_created, 4);
    let set = set_id(&model);
    assert_eq!(term_names(&store, ParentRef::Set(set)), vec!["Cloud", "Mobile"]);

    let cloud = &model.groups[0].sets[0].terms[0];
    let cloud_id = cloud.id.unwrap();
    assert_eq!(term_names(&store, ParentRef::Term(cloud_id)), vec!["Azure", "AWS"]);
    assert!(cloud.descendants().all(|t| t.id.is_some()));

    let azure = store.term(cloud.terms[0].id.unwrap()).unwrap().unwrap();
    assert_eq!(azure.parent, ParentRef::Term(cloud_id));
    assert_eq!(azure.set_id, set);
}

#[test]
fn new_term_fields_are_written() {
    let mut store = make_store();
    let mut term = Term::new("Legacy").with_description("Old platform").deprecated();
    term.is_available_for_tagging = false;
    term.language = Some(Lcid::new(1031));
    let mut model = make_model(UpdateBehavior::AddOnly, vec![term]);

    provision(&mut store, &mut model).unwrap();

    let info = store
        .term(model.groups[0].sets[0].terms[0].id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(info.description, "Old platform");
    assert!(info.is_deprecated);
    assert!(!info.is_available_for_tagging);
    assert_eq!(info.language, Lcid::new(1031));
    assert_eq!(info.default_label(Lcid::new(1031)).map(|l| l.value.as_str()), Some("Legacy"));
}

#[test]
fn explicit_term_id_is_kept() {
    let mut store = make_store();
    let id = TermStoreId::new();
    let mut model = make_model(UpdateBehavior::AddOnly, vec![Term::new("Cloud").with_id(id)]);

    provision(&mut store, &mut model).unwrap();

    assert_eq!(store.term(id).unwrap().unwrap().name, "Cloud");
}

#[test]
fn same_name_under_different_parents_creates_distinct_terms() {
    let mut store = make_store();
    let mut model = make_model(
        UpdateBehavior::AddOnly,
        vec![
            Term::new("Europe").with_child(Term::new("Sales")),
            Term::new("Asia").with_child(Term::new("Sales")),
        ],
    );

    let report = provision(&mut store, &mut model).unwrap();

    assert_eq!(report.terms_created, 4);
    assert_eq!(store.terms_named("Sales").count(), 2);
}

// ── Match ────────────────────────────────────────────────────────

#[test]
fn rerun_matches_by_name_without_writes() {
    let mut store = make_store();
    let terms = || vec![Term::new("Cloud").with_child(Term::new("Azure"))];
    provision(&mut store, &mut make_model(UpdateBehavior::AddOnly, terms())).unwrap();
    store.reset_stats();

    let mut fresh = make_model(UpdateBehavior::AddOnly, terms());
    let report = provision(&mut store, &mut fresh).unwrap();

    assert_eq!(report.created(), 0);
    assert_eq!(store.stats().commits, 0);
    assert_eq!(store.term_count(), 2);
    assert!(fresh.groups[0].sets[0].terms[0].terms[0].id.is_some());
}

#[test]
fn add_only_keeps_existing_term_fields() {
    let mut store = make_store();
    let mut model = make_model(UpdateBehavior::AddOnly, vec![Term::new("Cloud").with_description("v1")]);
    provision(&mut store, &mut model).unwrap();

    model.groups[0].sets[0].terms[0].description = "v2".to_string();
    let report = provision(&mut store, &mut model).unwrap();

    assert_eq!(report.terms_updated, 0);
    let id = model.groups[0].sets[0].terms[0].id.unwrap();
    assert_eq!(store.term(id).unwrap().unwrap().description, "v1");
}

#[test]
fn overwrite_renames_term_matched_by_id() {
    let mut store = make_store();
    let mut model = make_model(UpdateBehavior::Overwrite, vec![Term::new("Cloud").with_description("v1")]);
    provision(&mut store, &mut model).unwrap();
    let id = model.groups[0].sets[0].terms[0].id.unwrap();

    let term = &mut model.groups[0].sets[0].terms[0];
    term.name = "Cloud Services".to_string();
    term.description = "v2".to_string();
    term.is_deprecated = true;
    let report = provision(&mut store, &mut model).unwrap();

    assert_eq!(report.terms_updated, 1);
    assert_eq!(report.terms_created, 0);
    let info = store.term(id).unwrap().unwrap();
    assert_eq!(info.name, "Cloud Services");
    assert_eq!(info.description, "v2");
    assert!(info.is_deprecated);
    assert_eq!(
        info.default_label(Lcid::EN_US).map(|l| l.value.as_str()),
        Some("Cloud Services")
    );
}

#[test]
fn overwrite_can_undeprecate() {
    let mut store = make_store();
    let mut model = make_model(UpdateBehavior::Overwrite, vec![Term::new("Legacy").deprecated()]);
    provision(&mut store, &mut model).unwrap();

    model.groups[0].sets[0].terms[0].is_deprecated = false;
    provision(&mut store, &mut model).unwrap();

    let id = model.groups[0].sets[0].terms[0].id.unwrap();
    assert!(!store.term(id).unwrap().unwrap().is_deprecated);
}

// ── Preconditions ────────────────────────────────────────────────

#[test]
fn explicit_id_used_elsewhere_fails_before_staging() {
    let mut store = make_store();
    let mut first = make_model(UpdateBehavior::AddOnly, vec![Term::new("Cloud")]);
    provision(&mut store, &mut first).unwrap();
    let taken = first.groups[0].sets[0].terms[0].id.unwrap();

    // Same Id, different parent: the explicit Id is not among the children.
    let mut set = TermSet::new("Sales");
    set.terms = vec![Term::new("Cloud Copy").with_id(taken)];
    let mut second = TaxonomyModel::new(vec![TermGroup::new("Projects").with_set(set)]);
    store.reset_stats();
    let err = provision(&mut store, &mut second).unwrap_err();

    assert!(matches!(err, ProvisionError::PreconditionViolation { id, .. } if id == taken));
    assert_eq!(store.terms_named("Cloud Copy").count(), 0);
    assert_eq!(store.term_count(), 1);
}

#[test]
fn explicit_id_from_another_set_is_not_masked_by_a_same_named_sibling() {
    let mut store = make_store();
    let mut seed = TaxonomyModel::new(vec![
        TermGroup::new("Projects")
            .with_set(TermSet::new("Library").with_term(Term::new("Other")))
            .with_set(TermSet::new("Marketing").with_term(Term::new("Cloud"))),
    ]);
    provision(&mut store, &mut seed).unwrap();
    let other = seed.groups[0].sets[0].terms[0].id.unwrap();
    let cloud = seed.groups[0].sets[1].terms[0].id.unwrap();

    let mut model = seed.clone();
    model.groups[0].sets[1].terms[0].id = Some(other);
    store.reset_stats();
    let err = provision(&mut store, &mut model).unwrap_err();

    assert!(matches!(err, ProvisionError::PreconditionViolation { id, .. } if id == other));
    assert_eq!(model.groups[0].sets[1].terms[0].id, Some(other));
    assert_eq!(store.stats().commits, 0);
    assert_eq!(store.term(cloud).unwrap().unwrap().name, "Cloud");
}

#[test]
fn two_model_terms_resolving_to_one_node_fail() {
    let mut store = make_store();
    let existing = TermStoreId::new();
    let mut model = make_model(UpdateBehavior::AddOnly, vec![Term::new("Cloud").with_id(existing)]);
    provision(&mut store, &mut model).unwrap();

    let mut model = make_model(
        UpdateBehavior::AddOnly,
        vec![Term::new("Cloud"), Term::new("Other").with_id(existing)],
    );
    let err = provision(&mut store, &mut model).unwrap_err();

    assert!(matches!(err, ProvisionError::PreconditionViolation { .. }));
    assert_eq!(store.term_count(), 1);
}

#[test]
fn failed_commit_keeps_earlier_batches() {
    let mut store = make_store();
    let mut model = make_model(UpdateBehavior::AddOnly, vec![Term::new("Cloud")]);
    provision(&mut store, &mut model).unwrap();

    let mut model = make_model(
        UpdateBehavior::AddOnly,
        vec![Term::new("Cloud"), Term::new("Mobile")],
    );
    store.fail_next_commit("throttled");
    let err = provision(&mut store, &mut model).unwrap_err();

    assert!(matches!(err, ProvisionError::Store(_)));
    assert_eq!(store.term_count(), 1);
    // The failed batch is gone; a rerun creates the term.
    let report = provision(&mut store, &mut model).unwrap();
    assert_eq!(report.terms_created, 1);
    assert_eq!(store.terms_named("Mobile").count(), 1);
}
