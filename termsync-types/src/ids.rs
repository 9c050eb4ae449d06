//! Identifier type for every node of a term store.
//!
//! Groups, sets and terms share a single Id space: an Id, once assigned, is
//! unique across the whole store. The all-zero Id is what stores report for
//! "no Id" and never names a node.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Id of a group, set or term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermStoreId(Uuid);

impl TermStoreId {
    pub const NIL: TermStoreId = TermStoreId(Uuid::nil());

    /// Generates the Id of a node about to be created. Ids are v7, so the
    /// ones generated during a run sort in creation order.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// The Id itself, or `None` for the nil Id. A model node carrying a nil
    /// Id is treated as having none.
    #[must_use]
    pub fn non_nil(self) -> Option<Self> {
        (!self.is_nil()).then_some(self)
    }

    /// Accepts the hyphenated, simple, braced (`{...}`) and `urn:uuid:`
    /// forms, ignoring surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for TermStoreId {
    fn default() -> Self {
        Self::NIL
    }
}

impl fmt::Display for TermStoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TermStoreId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Uuid> for TermStoreId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
