use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use rolegate_auth::{AdminRequest, Profile, RequestStatus, ReviewOutcome};
use rolegate_core::UserUid;

use super::{DirectoryStore, StoreError, check_new_profile};

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<UserUid, Profile>,
    admin_requests: HashMap<UserUid, AdminRequest>,
    /// Insertion order of `admin_requests`.
    request_order: Vec<UserUid>,
}

/// In-memory directory for tests/dev.
///
/// Both collections sit behind a single lock, which is what makes the paired
/// writes atomic.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<Collections>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile_count(&self) -> usize {
        self.inner.read().map(|c| c.users.len()).unwrap_or(0)
    }

    pub fn admin_request_count(&self) -> usize {
        self.inner.read().map(|c| c.admin_requests.len()).unwrap_or(0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl DirectoryStore for InMemoryDirectory {
    async fn get_profile(&self, uid: UserUid) -> Result<Option<Profile>, StoreError> {
        let c = self.inner.read().map_err(|_| poisoned())?;
        Ok(c.users.get(&uid).cloned())
    }

    async fn create_profile(&self, profile: Profile, request: Option<AdminRequest>) -> Result<(), StoreError> {
        check_new_profile(&profile, request.as_ref())?;

        let mut c = self.inner.write().map_err(|_| poisoned())?;
        if c.users.contains_key(&profile.uid) {
            return Err(StoreError::Conflict(format!("profile {} already exists", profile.uid)));
        }
        if c.users.values().any(|p| p.email == profile.email) {
            return Err(StoreError::Conflict(format!("email {} already has a profile", profile.email)));
        }
        if c.admin_requests.contains_key(&profile.uid) {
            return Err(StoreError::Conflict(format!("admin request {} already exists", profile.uid)));
        }

        if let Some(req) = request {
            c.request_order.push(req.uid);
            c.admin_requests.insert(req.uid, req);
        }
        c.users.insert(profile.uid, profile);
        Ok(())
    }

    async fn get_admin_request(&self, uid: UserUid) -> Result<Option<AdminRequest>, StoreError> {
        let c = self.inner.read().map_err(|_| poisoned())?;
        Ok(c.admin_requests.get(&uid).cloned())
    }

    async fn list_pending_requests(&self) -> Result<Vec<AdminRequest>, StoreError> {
        let c = self.inner.read().map_err(|_| poisoned())?;
        Ok(c.request_order
            .iter()
            .filter_map(|uid| c.admin_requests.get(uid))
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn record_review(&self, outcome: &ReviewOutcome) -> Result<(), StoreError> {
        let uid = outcome.request.uid;
        let mut c = self.inner.write().map_err(|_| poisoned())?;

        match c.admin_requests.get(&uid) {
            None => return Err(StoreError::Conflict(format!("no admin request for {uid}"))),
            Some(current) if !current.is_pending() => {
                return Err(StoreError::Conflict(format!(
                    "admin request {uid} is already {}",
                    current.status
                )));
            }
            Some(_) => {}
        }
        if !c.users.contains_key(&uid) {
            return Err(StoreError::Invariant(format!("admin request {uid} has no profile")));
        }

        c.admin_requests.insert(uid, outcome.request.clone());
        if let Some(profile) = c.users.get_mut(&uid) {
            profile.role = outcome.profile_role;
        }
        Ok(())
    }
}
