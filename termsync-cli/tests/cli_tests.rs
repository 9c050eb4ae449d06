use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use termsync_cli::{RunOptions, load_directory, load_model, parse_parameter, run, summarize};
use termsync_engine::{ProvisionReport, ReuseOutcome};
use termsync_store::{MemoryTermStore, ParentRef, TermStore};
use termsync_types::{Lcid, TermStoreId};

const MODEL: &str = r#"{
    "groups": [{
        "name": "Projects",
        "sets": [{
            "name": "{parameter:Client} Marketing",
            "owner": "alice@contoso.com",
            "terms": [
                { "name": "Cloud", "custom_sort_order": 2 },
                { "name": "Mobile", "custom_sort_order": 1 }
            ]
        }]
    }]
}"#;

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

fn options(dir: &Path) -> RunOptions {
    let model = dir.join("taxonomy.json");
    if !model.exists() {
        write(&model, MODEL);
    }
    let mut options = RunOptions::new(model, dir.join("store.json"));
    options.parameters = vec![("Client".to_string(), "Contoso".to_string())];
    options
}

// ── parse_parameter ──────────────────────────────────────────────

#[test]
fn parameter_splits_on_first_equals() {
    assert_eq!(
        parse_parameter("Client=Contoso").unwrap(),
        ("Client".to_string(), "Contoso".to_string())
    );
    assert_eq!(
        parse_parameter(" Query =a=b").unwrap(),
        ("Query".to_string(), "a=b".to_string())
    );
    assert_eq!(
        parse_parameter("Empty=").unwrap(),
        ("Empty".to_string(), String::new())
    );
}

#[test]
fn parameter_without_key_or_equals_is_rejected() {
    assert!(parse_parameter("Client").is_err());
    assert!(parse_parameter("=Contoso").is_err());
}

// ── Loading ──────────────────────────────────────────────────────

#[test]
fn missing_model_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_model(&dir.path().join("nope.json")).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read model"));
}

#[test]
fn malformed_principal_list_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("principals.json");
    write(&path, "{ not json");
    assert!(load_directory(Some(&path)).is_err());
}

#[test]
fn principal_list_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("principals.json");
    write(&path, r#"["Alice@Contoso.com"]"#);

    let directory = load_directory(Some(&path)).unwrap();

    assert!(directory.principal_exists("alice@contoso.com").unwrap());
    assert!(!directory.principal_exists("mallory@contoso.com").unwrap());
}

// ── run ──────────────────────────────────────────────────────────

#[test]
fn first_run_creates_store_and_writes_ids_back() {
    let dir = tempfile::tempdir().unwrap();
    let options = options(dir.path());

    let report = run(&options).unwrap();

    assert_eq!(report.groups_created, 1);
    assert_eq!(report.sets_created, 1);
    assert_eq!(report.terms_created, 2);
    assert!(report.is_clean());

    let model = load_model(&options.model).unwrap();
    let group = model.groups[0].id.unwrap();
    let set = model.groups[0].sets[0].id.unwrap();
    let store = MemoryTermStore::load(&options.store).unwrap();
    let info = store.term_set(group, set).unwrap().unwrap();
    assert_eq!(info.name, "Contoso Marketing");
    let mobile = model.groups[0].sets[0].terms[1].id.unwrap();
    let cloud = model.groups[0].sets[0].terms[0].id.unwrap();
    assert_eq!(info.custom_sort_order, Some(format!("{mobile}:{cloud}")));
}

#[test]
fn second_run_leaves_files_as_they_were() {
    let dir = tempfile::tempdir().unwrap();
    let options = options(dir.path());
    run(&options).unwrap();
    let store_before = fs::read_to_string(&options.store).unwrap();
    let model_before = fs::read_to_string(&options.model).unwrap();

    let report = run(&options).unwrap();

    assert_eq!(report.created(), 0);
    assert_eq!(fs::read_to_string(&options.store).unwrap(), store_before);
    assert_eq!(fs::read_to_string(&options.model).unwrap(), model_before);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(dir.path());
    options.dry_run = true;

    let report = run(&options).unwrap();

    assert_eq!(report.terms_created, 2);
    assert!(!options.store.exists());
    assert_eq!(fs::read_to_string(&options.model).unwrap(), MODEL);
}

#[test]
fn new_store_uses_requested_language() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options(dir.path());
    options.language = Lcid::new(1031);

    run(&options).unwrap();

    let model = load_model(&options.model).unwrap();
    let store = MemoryTermStore::load(&options.store).unwrap();
    let set = store
        .term_set(model.groups[0].id.unwrap(), model.groups[0].sets[0].id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(set.language, Lcid::new(1031));
}

#[test]
fn unknown_owner_from_principal_list_is_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let principals = dir.path().join("principals.json");
    write(&principals, r#"["bob@contoso.com"]"#);
    let mut options = options(dir.path());
    options.principals = Some(principals);

    let report = run(&options).unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert!(summarize(&report).contains("warning: owner 'alice@contoso.com'"));
    let model = load_model(&options.model).unwrap();
    let store = MemoryTermStore::load(&options.store).unwrap();
    let set = store
        .term_set(model.groups[0].id.unwrap(), model.groups[0].sets[0].id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(set.owner, None);
}

#[test]
fn failed_run_keeps_applied_batches_but_not_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let id = TermStoreId::new();
    let model = format!(
        r#"{{ "groups": [{{ "name": "Projects", "sets": [
            {{ "name": "Marketing", "terms": [{{ "id": "{id}", "name": "Cloud" }}] }},
            {{ "name": "Sales", "terms": [{{ "id": "{id}", "name": "Cloud" }}] }}
        ] }}] }}"#
    );
    let model_path = dir.path().join("taxonomy.json");
    write(&model_path, &model);
    let options = RunOptions::new(&model_path, dir.path().join("store.json"));

    let err = run(&options).unwrap_err();

    assert!(format!("{err:#}").contains("Provisioning failed"));
    let store = MemoryTermStore::load(&options.store).unwrap();
    assert_eq!(store.term(id).unwrap().map(|t| t.name), Some("Cloud".to_string()));
    assert_eq!(fs::read_to_string(&model_path).unwrap(), model);
}

// ── summarize ────────────────────────────────────────────────────

#[test]
fn summary_lists_counts_and_unresolved_reuse() {
    let source = TermStoreId::new();
    let set = TermStoreId::new();
    let report = ProvisionReport {
        terms_created: 3,
        reuse_links_created: 1,
        unresolved_reuse: vec![ReuseOutcome {
            term_id: Some(source),
            term_name: "Ghost".to_string(),
            parent: ParentRef::Set(set),
            link_id: None,
            success: false,
        }],
        ..Default::default()
    };

    let summary = summarize(&report);

    assert!(summary.contains("terms:  3 created, 0 updated, 1 reuse link(s)"));
    assert!(summary.contains(&format!("unresolved reuse: 'Ghost' ({source}) under ")));
}
