//! Caller roles and the resolved identity attached to every request.

use crate::{ParseEnumError, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Access level of a caller. Resolved once at authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Assigns, closes and deletes tickets; manages users
    Manager,
    /// Works tickets assigned to them
    Support,
    /// Opens tickets and follows their own
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Manager, Role::Support, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "MANAGER",
            Self::Support => "SUPPORT",
            Self::User => "USER",
        }
    }

    /// Whether tickets may be assigned to an identity holding this role.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Self::User)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MANAGER" => Ok(Self::Manager),
            "SUPPORT" => Ok(Self::Support),
            "USER" => Ok(Self::User),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

/// Verified caller identity produced by authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}
