use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rolegate_core::{Email, UserUid};

use crate::{Profile, Role};

/// Per-client snapshot of the authenticated identity, taken at login.
///
/// This is a cache of [`Profile::role`], never authoritative: a role change
/// made after login (e.g. an approval) is not reflected until the next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub uid: UserUid,
    pub email: Email,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

impl SessionContext {
    pub fn for_profile(profile: &Profile, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            uid: profile.uid,
            email: profile.email.clone(),
            role: profile.role,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// Deterministically check the session's validity window at `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), SessionValidationError> {
        if self.expires_at <= self.issued_at {
            return Err(SessionValidationError::InvalidTimeWindow);
        }
        if now < self.issued_at {
            return Err(SessionValidationError::NotYetValid);
        }
        if now >= self.expires_at {
            return Err(SessionValidationError::Expired);
        }
        Ok(())
    }
}
