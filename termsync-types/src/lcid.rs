use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Windows-style locale identifier (e.g. 1033 for en-US).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lcid(u32);

impl Lcid {
    /// English (United States).
    pub const EN_US: Lcid = Lcid(1033);

    /// Creates a locale identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Lcid {
    fn default() -> Self {
        Self::EN_US
    }
}

impl fmt::Display for Lcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Lcid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl FromStr for Lcid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u32>() {
            Ok(0) | Err(_) => Err(Error::InvalidLcid(s.to_string())),
            Ok(value) => Ok(Self(value)),
        }
    }
}
