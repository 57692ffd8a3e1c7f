//! Application-owned user profile (one per identity UID).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use rolegate_core::{DomainError, Email, UserUid};

use crate::Role;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl core::fmt::Display for Gender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "" => Err(DomainError::validation("please select gender")),
            _ => Err(DomainError::validation("gender must be one of: male, female, other")),
        }
    }
}

/// Per-user role and attributes.
///
/// `role` is authoritative; sessions only cache it. Gender and date of birth
/// are absent for accounts seeded outside the signup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub uid: UserUid,
    pub email: Email,
    pub role: Role,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }
}
