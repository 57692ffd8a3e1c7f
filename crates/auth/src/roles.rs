use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role held by a profile. This is the single source of truth for authorization.
///
/// The set is closed: adding a variant forces every `match` in the resolvers
/// and guards to be revisited.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Lecturer,
    Admin,
    /// Self-nominated admin awaiting review.
    PendingAdmin,
    /// Admin nomination that was turned down. Terminal.
    RejectedAdmin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Student,
        Role::Lecturer,
        Role::Admin,
        Role::PendingAdmin,
        Role::RejectedAdmin,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Lecturer => "lecturer",
            Role::Admin => "admin",
            Role::PendingAdmin => "pending_admin",
            Role::RejectedAdmin => "rejected_admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleParseError {
    #[error("unknown role '{0}'")]
    Unknown(String),
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| RoleParseError::Unknown(s.to_string()))
    }
}

/// Role a visitor may pick on the signup form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedRole {
    Student,
    Lecturer,
    Admin,
}

impl RequestedRole {
    pub const ALL: [RequestedRole; 3] =
        [RequestedRole::Student, RequestedRole::Lecturer, RequestedRole::Admin];

    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestedRole::Student => "student",
            RequestedRole::Lecturer => "lecturer",
            RequestedRole::Admin => "admin",
        }
    }
}

impl core::fmt::Display for RequestedRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestedRole {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestedRole::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| RoleParseError::Unknown(s.to_string()))
    }
}
