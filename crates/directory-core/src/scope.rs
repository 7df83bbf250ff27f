//! Search scope and alias dereference policies.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How far a search extends from its base DN.
///
/// Each scope selects a distinct wire operation: `Base` reads a single entry,
/// `OneLevel` lists the immediate children, `Subtree` searches the base and
/// all descendants. The enum is closed; untyped scope values enter through
/// [`TryFrom<i32>`] or [`FromStr`], which reject anything unrecognized before
/// any network interaction takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    /// Base object only.
    Base,
    /// One level below the base.
    OneLevel,
    /// Entire subtree.
    Subtree,
}

impl SearchScope {
    /// Returns the protocol-level numeric value of the scope.
    #[must_use]
    pub const fn wire_value(self) -> i32 {
        match self {
            Self::Base => 0,
            Self::OneLevel => 1,
            Self::Subtree => 2,
        }
    }
}

impl TryFrom<i32> for SearchScope {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Base),
            1 => Ok(Self::OneLevel),
            2 => Ok(Self::Subtree),
            other => Err(Error::InvalidScope(other)),
        }
    }
}

impl FromStr for SearchScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "one" | "onelevel" => Ok(Self::OneLevel),
            "sub" | "subtree" => Ok(Self::Subtree),
            other => Err(Error::InvalidArgument(format!(
                "unrecognized search scope `{other}`"
            ))),
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Base => "base",
            Self::OneLevel => "onelevel",
            Self::Subtree => "subtree",
        };
        f.write_str(name)
    }
}

/// How alias entries are followed during a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerefPolicy {
    /// Never dereference aliases.
    #[default]
    Never,
    /// Dereference while descending the subtree, not when locating the base.
    Searching,
    /// Dereference when locating the base, not while descending.
    Finding,
    /// Always dereference aliases.
    Always,
}
