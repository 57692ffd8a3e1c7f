//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Opaque identifier of an identity (assigned once by the identity provider,
/// immutable thereafter). Profiles and admin requests are keyed by it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserUid(Uuid);

/// Identifier of a server-side session, carried by the client in a cookie.
///
/// Must be unguessable: it is the only credential a browser presents after login.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal, $ctor:ident) => {
        impl $t {
            /// Create a new identifier.
            pub fn new() -> Self {
                Self(Uuid::$ctor())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s.trim())
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

// UIDs are time-ordered so the backing store's natural order is signup order;
// session ids are fully random.
impl_uuid_newtype!(UserUid, "UserUid", now_v7);
impl_uuid_newtype!(SessionId, "SessionId", new_v4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_round_trips_through_display() {
        let uid = UserUid::new();
        let parsed: UserUid = uid.to_string().parse().unwrap();
        assert_eq!(uid, parsed);
    }

    #[test]
    fn malformed_uid_is_rejected_with_type_name() {
        let err = "not-a-uuid".parse::<UserUid>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(ref m) if m.starts_with("UserUid")));
    }

    #[test]
    fn session_ids_are_v4() {
        let sid = SessionId::new();
        assert_eq!(sid.as_uuid().get_version_num(), 4);
        assert_ne!(sid, SessionId::new());
    }
}
