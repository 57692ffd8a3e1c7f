//! Response views and form bodies.
//!
//! Pages are rendered as JSON documents; markup is left to whatever sits in
//! front of the service.

use serde::{Deserialize, Serialize};

use rolegate_auth::{AdminRequest, Profile, Role, SessionContext};
use rolegate_core::{Email, UserUid};

use crate::cookies::Flash;

#[derive(Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub uid: UserUid,
    pub email: Email,
    pub role: Role,
}

impl From<&SessionContext> for SessionView {
    fn from(s: &SessionContext) -> Self {
        Self {
            uid: s.uid,
            email: s.email.clone(),
            role: s.role,
        }
    }
}

/// Common envelope for every rendered page.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub page: &'static str,
    pub flash: Option<Flash>,
    pub session: Option<SessionView>,
    #[serde(flatten)]
    pub body: T,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Empty {}

#[derive(Debug, Clone, Serialize)]
pub struct FormFields {
    pub fields: &'static [&'static str],
    pub action: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingCount {
    pub pending_requests: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestList {
    pub requests: Vec<AdminRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    pub request: AdminRequest,
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileDetail {
    pub profile: Profile,
}
