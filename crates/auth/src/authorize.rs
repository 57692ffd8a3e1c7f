//! Authorization Guard.
//!
//! Checks compose left-to-right and authentication is always checked first:
//! a request without a session is `Unauthenticated`, never `Forbidden`.
//!
//! - No IO
//! - No panics
//! - Every failure is recoverable (the API turns it into a redirect)

use serde::Serialize;
use thiserror::Error;

use crate::{Role, SessionContext};

/// Set of roles allowed to perform an operation, declared per endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct RoleSet {
    bits: u8,
}

const fn bit(role: Role) -> u8 {
    match role {
        Role::Student => 1 << 0,
        Role::Lecturer => 1 << 1,
        Role::Admin => 1 << 2,
        Role::PendingAdmin => 1 << 3,
        Role::RejectedAdmin => 1 << 4,
    }
}

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet { bits: 0 };

    pub const fn only(role: Role) -> Self {
        Self { bits: bit(role) }
    }

    pub const fn with(self, role: Role) -> Self {
        Self {
            bits: self.bits | bit(role),
        }
    }

    pub fn of(roles: &[Role]) -> Self {
        roles.iter().fold(Self::EMPTY, |set, r| set.with(*r))
    }

    pub const fn contains(&self, role: Role) -> bool {
        self.bits & bit(role) != 0
    }

    pub fn roles(&self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| self.contains(*r)).collect()
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden for role '{role}'")]
    Forbidden { role: Role },
}

impl GuardError {
    pub const fn user_message(&self) -> &'static str {
        match self {
            GuardError::Unauthenticated => "Please log in to continue.",
            GuardError::Forbidden { .. } => "You are not authorized to view that page.",
        }
    }
}

pub fn require_authenticated(session: Option<&SessionContext>) -> Result<&SessionContext, GuardError> {
    session.ok_or(GuardError::Unauthenticated)
}

pub fn require_role(session: &SessionContext, allowed: RoleSet) -> Result<(), GuardError> {
    if allowed.contains(session.role) {
        Ok(())
    } else {
        Err(GuardError::Forbidden { role: session.role })
    }
}

/// Full guard: authenticated, then role membership.
pub fn authorize(session: Option<&SessionContext>, allowed: RoleSet) -> Result<&SessionContext, GuardError> {
    let session = require_authenticated(session)?;
    require_role(session, allowed)?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use rolegate_core::{Email, UserUid};

    fn session(role: Role) -> SessionContext {
        let now = Utc::now();
        SessionContext {
            uid: UserUid::new(),
            email: Email::parse("a@x.com").unwrap(),
            role,
            issued_at: now,
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn role_set_membership() {
        let set = RoleSet::only(Role::Lecturer).with(Role::Admin);
        assert!(set.contains(Role::Lecturer));
        assert!(set.contains(Role::Admin));
        assert!(!set.contains(Role::Student));
        assert_eq!(set, RoleSet::of(&[Role::Admin, Role::Lecturer]));
        assert_eq!(set.roles(), vec![Role::Lecturer, Role::Admin]);
    }

    #[test]
    fn missing_session_is_unauthenticated() {
        assert_eq!(authorize(None, RoleSet::only(Role::Admin)), Err(GuardError::Unauthenticated));
        assert_eq!(authorize(None, RoleSet::EMPTY), Err(GuardError::Unauthenticated));
    }

    #[test]
    fn role_outside_set_is_forbidden() {
        let s = session(Role::Student);
        assert_eq!(
            authorize(Some(&s), RoleSet::only(Role::Admin)),
            Err(GuardError::Forbidden { role: Role::Student })
        );
    }

    #[test]
    fn lecturer_dashboard_variant_admits_admins() {
        let allowed = RoleSet::only(Role::Lecturer).with(Role::Admin);
        let admin = session(Role::Admin);
        assert_eq!(authorize(Some(&admin), allowed).map(|s| s.role), Ok(Role::Admin));
    }

    fn any_role() -> impl Strategy<Value = Role> {
        (0usize..Role::ALL.len()).prop_map(|i| Role::ALL[i])
    }

    proptest! {
        #[test]
        fn unauthenticated_never_forbidden(roles in proptest::collection::vec(any_role(), 0..5)) {
            prop_assert_eq!(authorize(None, RoleSet::of(&roles)), Err(GuardError::Unauthenticated));
        }

        #[test]
        fn allowed_iff_member(role in any_role(), roles in proptest::collection::vec(any_role(), 0..5)) {
            let s = session(role);
            let set = RoleSet::of(&roles);
            match authorize(Some(&s), set) {
                Ok(_) => prop_assert!(roles.contains(&role)),
                Err(e) => prop_assert_eq!(e, GuardError::Forbidden { role }),
            }
            prop_assert_eq!(authorize(Some(&s), set).is_ok(), roles.contains(&role));
        }
    }
}
