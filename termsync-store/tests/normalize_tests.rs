use proptest::prelude::*;
use termsync_store::{normalize_name, MemoryDirectory, OpenDirectory, PrincipalDirectory};

// ── normalize_name ───────────────────────────────────────────────

#[test]
fn trims_and_collapses_whitespace() {
    assert_eq!(normalize_name("  Cloud \t  Services  "), "Cloud Services");
}

#[test]
fn replaces_ampersand_and_quote() {
    assert_eq!(normalize_name("R&D"), "R\u{FF06}D");
    assert_eq!(normalize_name("\"Quoted\""), "\u{FF02}Quoted\u{FF02}");
}

#[test]
fn empty_and_blank_names_normalize_to_empty() {
    assert_eq!(normalize_name(""), "");
    assert_eq!(normalize_name(" \t "), "");
}

proptest! {
    #[test]
    fn normalization_is_idempotent(name in "[ a-zA-Z&\"\t]{0,40}") {
        let once = normalize_name(&name);
        prop_assert_eq!(normalize_name(&once), once);
    }

    #[test]
    fn normalized_names_have_no_ascii_specials(name in "[ a-zA-Z&\"\t]{0,40}") {
        let normalized = normalize_name(&name);
        prop_assert!(!normalized.contains('&'));
        prop_assert!(!normalized.contains('"'));
        prop_assert!(!normalized.contains("  "));
        prop_assert_eq!(normalized.trim(), normalized.as_str());
    }
}

// ── Directories ──────────────────────────────────────────────────

#[test]
fn open_directory_accepts_everyone() {
    assert!(OpenDirectory.principal_exists("anyone@contoso.com").unwrap());
}

#[test]
fn memory_directory_is_case_insensitive() {
    let directory = MemoryDirectory::new(["alice@contoso.com", "bob@contoso.com"]);
    assert!(directory.principal_exists("Alice@Contoso.com").unwrap());
    assert!(directory.principal_exists(" bob@contoso.com ").unwrap());
    assert!(!directory.principal_exists("mallory@contoso.com").unwrap());
    assert_eq!(directory.len(), 2);
}

#[test]
fn memory_directory_from_json_list() {
    let directory: MemoryDirectory = serde_json::from_str(r#"["alice", "bob"]"#).unwrap();
    assert!(directory.principal_exists("bob").unwrap());
}
