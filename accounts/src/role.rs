//! Access tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a role string does not name a known [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Enumerated access tier deciding which areas of the app are reachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Pastor,
    Treasurer,
    Deacon,
    Member,
    Visitor,
}

impl Role {
    /// Every known role, in seniority order.
    pub const ALL: [Role; 5] = [Role::Pastor, Role::Treasurer, Role::Deacon, Role::Member, Role::Visitor];

    /// Wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pastor => "pastor",
            Self::Treasurer => "treasurer",
            Self::Deacon => "deacon",
            Self::Member => "member",
            Self::Visitor => "visitor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == raw)
            .ok_or_else(|| UnknownRole(raw.to_owned()))
    }
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
