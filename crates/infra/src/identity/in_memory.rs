use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use rolegate_auth::Password;
use rolegate_core::{Email, UserUid};

use super::{Identity, IdentityError, IdentityProvider, hash_off_thread, verification_link, verify_off_thread};

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    password_hash: String,
    verification_token: Option<String>,
}

/// In-memory identity provider for tests/dev. Hashes passwords like the real one.
#[derive(Debug)]
pub struct InMemoryIdentityProvider {
    base_url: String,
    accounts: RwLock<HashMap<Email, Account>>,
}

impl InMemoryIdentityProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            accounts: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last verification token issued for `email`, if any.
    pub fn verification_token(&self, email: &Email) -> Option<String> {
        let accounts = self.accounts.read().ok()?;
        accounts.get(email)?.verification_token.clone()
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

fn poisoned() -> IdentityError {
    IdentityError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, IdentityError> {
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        Ok(accounts.get(email).map(|a| a.identity.clone()))
    }

    async fn create(&self, email: &Email, password: &Password) -> Result<Identity, IdentityError> {
        // Hash before taking the write lock.
        let password_hash = hash_off_thread(password.expose().to_string()).await?;

        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        if accounts.contains_key(email) {
            return Err(IdentityError::AlreadyExists);
        }

        let identity = Identity {
            uid: UserUid::new(),
            email: email.clone(),
            created_at: Utc::now(),
        };
        accounts.insert(
            email.clone(),
            Account {
                identity: identity.clone(),
                password_hash,
                verification_token: None,
            },
        );
        Ok(identity)
    }

    async fn verify_password(&self, email: &Email, password: &Password) -> Result<Identity, IdentityError> {
        let account = {
            let accounts = self.accounts.read().map_err(|_| poisoned())?;
            accounts.get(email).cloned().ok_or(IdentityError::NotFound)?
        };

        if verify_off_thread(password.expose().to_string(), account.password_hash.clone()).await? {
            Ok(account.identity)
        } else {
            Err(IdentityError::InvalidCredentials)
        }
    }

    async fn delete(&self, uid: UserUid) -> Result<(), IdentityError> {
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        let before = accounts.len();
        accounts.retain(|_, a| a.identity.uid != uid);
        if accounts.len() == before {
            return Err(IdentityError::NotFound);
        }
        Ok(())
    }

    async fn email_verification_link(&self, email: &Email) -> Result<String, IdentityError> {
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        let account = accounts.get_mut(email).ok_or(IdentityError::NotFound)?;
        let token = Uuid::new_v4().simple().to_string();
        account.verification_token = Some(token.clone());
        Ok(verification_link(&self.base_url, &token))
    }
}
