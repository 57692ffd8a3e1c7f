//! Directory store: the `users` (profiles) and `admin_requests` collections.
//!
//! Both collections live behind one trait because every write that touches an
//! admin request must also touch its profile, atomically:
//!
//! - [`DirectoryStore::create_profile`] writes a profile and, for admin
//!   nominations, its pending request.
//! - [`DirectoryStore::record_review`] writes a reviewed request and the
//!   profile's new role, and only if the request is still pending.
//!
//! No reader can observe one half of either write.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryDirectory;
pub use postgres::{PostgresDirectory, SCHEMA};

use async_trait::async_trait;
use thiserror::Error;

use rolegate_auth::{AdminRequest, Profile, ReviewOutcome, Role};
use rolegate_core::UserUid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A write collided with existing state (duplicate key, request already reviewed).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The write would break the profile/request pairing.
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("profile {uid} has unrecognised role '{role}'")]
    UnrecognizedRole { uid: UserUid, role: String },

    #[error("store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn get_profile(&self, uid: UserUid) -> Result<Option<Profile>, StoreError>;

    /// Write a new profile together with its admin request (if any).
    async fn create_profile(&self, profile: Profile, request: Option<AdminRequest>) -> Result<(), StoreError>;

    async fn get_admin_request(&self, uid: UserUid) -> Result<Option<AdminRequest>, StoreError>;

    /// Pending requests in insertion order.
    async fn list_pending_requests(&self) -> Result<Vec<AdminRequest>, StoreError>;

    /// Persist a review: the request (compare-and-set on `pending`) and the
    /// owning profile's role.
    async fn record_review(&self, outcome: &ReviewOutcome) -> Result<(), StoreError>;
}

/// Checks shared by every implementation before a profile is created.
pub(crate) fn check_new_profile(profile: &Profile, request: Option<&AdminRequest>) -> Result<(), StoreError> {
    match (profile.role, request) {
        (Role::PendingAdmin, Some(req)) => {
            if req.uid != profile.uid {
                return Err(StoreError::Invariant(format!(
                    "admin request uid {} does not match profile uid {}",
                    req.uid, profile.uid
                )));
            }
            if !req.is_pending() {
                return Err(StoreError::Invariant("new admin request must be pending".into()));
            }
            Ok(())
        }
        (Role::PendingAdmin, None) => Err(StoreError::Invariant(
            "pending_admin profile requires an admin request".into(),
        )),
        (role, Some(_)) => Err(StoreError::Invariant(format!(
            "profile with role '{role}' cannot carry an admin request"
        ))),
        (_, None) => Ok(()),
    }
}
