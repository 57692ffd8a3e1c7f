//! Server-side session storage.
//!
//! A session is an expiring [`SessionContext`] keyed by an unguessable
//! [`SessionId`]. Expired entries are treated as absent and dropped on read.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use rolegate_auth::SessionContext;
use rolegate_core::SessionId;

pub trait SessionStore: Send + Sync {
    /// Store a session and return the id the client should present; `None`
    /// if the session could not be stored.
    fn insert(&self, session: SessionContext) -> Option<SessionId>;

    /// Live session for `id` at `now`, if any.
    fn get(&self, id: &SessionId, now: DateTime<Utc>) -> Option<SessionContext>;

    fn remove(&self, id: &SessionId) -> Option<SessionContext>;

    /// Drop every session that is no longer valid at `now`; returns how many.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn insert(&self, session: SessionContext) -> Option<SessionId> {
        (**self).insert(session)
    }

    fn get(&self, id: &SessionId, now: DateTime<Utc>) -> Option<SessionContext> {
        (**self).get(id, now)
    }

    fn remove(&self, id: &SessionId) -> Option<SessionContext> {
        (**self).remove(id)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        (**self).purge_expired(now)
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<SessionId, SessionContext>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: SessionContext) -> Option<SessionId> {
        let Ok(mut map) = self.inner.write() else {
            warn!(uid = %session.uid, "session.issue failed: store lock poisoned");
            return None;
        };
        let id = SessionId::new();
        debug!(uid = %session.uid, role = %session.role, "session.issue");
        map.insert(id, session);
        Some(id)
    }

    fn get(&self, id: &SessionId, now: DateTime<Utc>) -> Option<SessionContext> {
        let session = {
            let map = self.inner.read().ok()?;
            map.get(id).cloned()?
        };

        if session.validate(now).is_ok() {
            return Some(session);
        }

        if let Ok(mut map) = self.inner.write() {
            map.remove(id);
        }
        debug!(uid = %session.uid, "session.expired");
        None
    }

    fn remove(&self, id: &SessionId) -> Option<SessionContext> {
        let removed = self.inner.write().ok()?.remove(id);
        if let Some(s) = &removed {
            debug!(uid = %s.uid, "session.logout");
        }
        removed
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut map) = self.inner.write() else {
            return 0;
        };
        let before = map.len();
        map.retain(|_, s| s.validate(now).is_ok());
        before - map.len()
    }
}
