//! Token resolution for model strings.
//!
//! Names, descriptions, principals and property values in a model may
//! contain `{...}` placeholders. The engine passes every such string through
//! a [`TokenResolver`] before use, and registers a token for each group, set
//! and term it resolves so later nodes can refer to their Ids.

use regex_lite::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use termsync_types::TermStoreId;

/// A `{...}` placeholder. Braces cannot nest, so a stray `{` never hides a
/// placeholder that follows it.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

/// Resolves placeholders in model strings.
pub trait TokenResolver {
    /// Replaces every known `{...}` placeholder in `text`. Unknown
    /// placeholders are left as they are.
    fn parse_string(&self, text: &str) -> String;

    /// Makes a resolved node's Id available to later strings.
    fn add_token(&mut self, token: TaxonomyToken);
}

/// A placeholder for the Id of a resolved node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyToken {
    /// `{termgroupid:<group>}`
    Group { name: String, id: TermStoreId },
    /// `{termsetid:<group>:<set>}`
    Set {
        group: String,
        name: String,
        id: TermStoreId,
    },
    /// `{termid:<set>:<term>}`
    Term {
        set: String,
        name: String,
        id: TermStoreId,
    },
}

impl TaxonomyToken {
    pub fn placeholder(&self) -> String {
        match self {
            TaxonomyToken::Group { name, .. } => format!("{{termgroupid:{name}}}"),
            TaxonomyToken::Set { group, name, .. } => format!("{{termsetid:{group}:{name}}}"),
            TaxonomyToken::Term { set, name, .. } => format!("{{termid:{set}:{name}}}"),
        }
    }

    pub fn id(&self) -> TermStoreId {
        match self {
            TaxonomyToken::Group { id, .. }
            | TaxonomyToken::Set { id, .. }
            | TaxonomyToken::Term { id, .. } => *id,
        }
    }
}

/// In-memory [`TokenResolver`] with `{parameter:<key>}` support.
///
/// Placeholder matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    /// Parameter values keyed by lowercase name.
    parameters: BTreeMap<String, String>,
    /// Resolved values keyed by lowercase placeholder.
    values: HashMap<String, String>,
    tokens: Vec<TaxonomyToken>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, key: &str, value: impl Into<String>) -> Self {
        self.add_parameter(key, value);
        self
    }

    pub fn add_parameter(&mut self, key: &str, value: impl Into<String>) {
        self.parameters
            .insert(key.trim().to_lowercase(), value.into());
    }

    /// Tokens registered so far, in registration order.
    pub fn tokens(&self) -> &[TaxonomyToken] {
        &self.tokens
    }

    /// `placeholder` is the whole `{...}` match, `inner` what sits between
    /// the braces.
    fn resolve(&self, placeholder: &str, inner: &str) -> Option<&String> {
        if let Some((kind, key)) = inner.split_once(':') {
            if kind.trim().eq_ignore_ascii_case("parameter") {
                return self.parameters.get(&key.trim().to_lowercase());
            }
        }
        self.values.get(&placeholder.to_lowercase())
    }
}

impl TokenResolver for TokenRegistry {
    fn parse_string(&self, text: &str) -> String {
        PLACEHOLDER
            .replace_all(text, |caps: &Captures<'_>| {
                self.resolve(&caps[0], &caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn add_token(&mut self, token: TaxonomyToken) {
        self.values
            .insert(token.placeholder().to_lowercase(), token.id().to_string());
        self.tokens.push(token);
    }
}
