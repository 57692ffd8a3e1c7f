//! Identity Provider adapter: account creation, lookup, and credential checks.
//!
//! The provider owns credentials; the rest of the system only ever sees the
//! opaque [`UserUid`] it assigns.

mod in_memory;
mod password;
mod postgres;

pub use in_memory::InMemoryIdentityProvider;
pub use password::{hash_off_thread, hash_password, verify_off_thread, verify_password};
pub use postgres::PostgresIdentityProvider;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use rolegate_auth::Password;
use rolegate_core::{Email, UserUid};

/// Externally managed account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: UserUid,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("an identity already exists for this email")]
    AlreadyExists,

    #[error("identity not found")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("identity backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, IdentityError>;

    /// Create an identity. Fails with `AlreadyExists` if the email is taken.
    async fn create(&self, email: &Email, password: &Password) -> Result<Identity, IdentityError>;

    /// Check a credential; `NotFound` for unknown emails, `InvalidCredentials`
    /// for a wrong password.
    async fn verify_password(&self, email: &Email, password: &Password) -> Result<Identity, IdentityError>;

    async fn delete(&self, uid: UserUid) -> Result<(), IdentityError>;

    /// Issue an email verification link for an existing identity.
    async fn email_verification_link(&self, email: &Email) -> Result<String, IdentityError>;
}

pub(crate) fn verification_link(base_url: &str, token: &str) -> String {
    format!("{}/verify-email?token={}", base_url.trim_end_matches('/'), token)
}
