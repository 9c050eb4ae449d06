//! Principal directory: answers whether an owner, contributor or manager
//! name resolves to a real account.

use crate::StoreResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Existence check for principals. Pure query, never mutates.
pub trait PrincipalDirectory {
    fn principal_exists(&self, name: &str) -> StoreResult<bool>;
}

/// Directory that accepts every principal.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenDirectory;

impl PrincipalDirectory for OpenDirectory {
    fn principal_exists(&self, _name: &str) -> StoreResult<bool> {
        Ok(true)
    }
}

/// Fixed set of known principals, matched case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryDirectory {
    principals: BTreeSet<String>,
}

impl MemoryDirectory {
    pub fn new<I, S>(principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principals: principals.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add(&mut self, principal: impl Into<String>) {
        self.principals.insert(principal.into());
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

impl PrincipalDirectory for MemoryDirectory {
    fn principal_exists(&self, name: &str) -> StoreResult<bool> {
        let name = name.trim();
        Ok(self.principals.iter().any(|p| p.eq_ignore_ascii_case(name)))
    }
}
