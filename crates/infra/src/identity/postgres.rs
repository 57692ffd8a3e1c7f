//! Postgres-backed identity provider (`identities` table, argon2 hashes).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use rolegate_auth::Password;
use rolegate_core::{Email, UserUid};

use super::{Identity, IdentityError, IdentityProvider, hash_off_thread, verification_link, verify_off_thread};

#[derive(Debug, Clone)]
pub struct PostgresIdentityProvider {
    pool: Arc<PgPool>,
    base_url: String,
}

impl PostgresIdentityProvider {
    pub fn new(pool: PgPool, base_url: impl Into<String>) -> Self {
        Self {
            pool: Arc::new(pool),
            base_url: base_url.into(),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> IdentityError {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            IdentityError::AlreadyExists
        }
        other => IdentityError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn identity_from_row(row: &sqlx::postgres::PgRow) -> Result<Identity, IdentityError> {
    let uid: Uuid = row
        .try_get("uid")
        .map_err(|e| IdentityError::Backend(format!("failed to read uid: {e}")))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| IdentityError::Backend(format!("failed to read email: {e}")))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| IdentityError::Backend(format!("failed to read created_at: {e}")))?;

    Ok(Identity {
        uid: UserUid::from_uuid(uid),
        email: Email::parse(&email).map_err(|e| IdentityError::Backend(e.to_string()))?,
        created_at,
    })
}

#[async_trait]
impl IdentityProvider for PostgresIdentityProvider {
    #[instrument(skip(self), fields(email = %email), err)]
    async fn find_by_email(&self, email: &Email) -> Result<Option<Identity>, IdentityError> {
        let row = sqlx::query("SELECT uid, email, created_at FROM identities WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;

        row.as_ref().map(identity_from_row).transpose()
    }

    #[instrument(skip(self, password), fields(email = %email), err)]
    async fn create(&self, email: &Email, password: &Password) -> Result<Identity, IdentityError> {
        let password_hash = hash_off_thread(password.expose().to_string()).await?;
        let identity = Identity {
            uid: UserUid::new(),
            email: email.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO identities (uid, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(identity.uid.as_uuid())
        .bind(identity.email.as_str())
        .bind(&password_hash)
        .bind(identity.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_identity", e))?;

        Ok(identity)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn verify_password(&self, email: &Email, password: &Password) -> Result<Identity, IdentityError> {
        let row = sqlx::query("SELECT uid, email, created_at, password_hash FROM identities WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("verify_password", e))?
            .ok_or(IdentityError::NotFound)?;

        let phc: String = row
            .try_get("password_hash")
            .map_err(|e| IdentityError::Backend(format!("failed to read password_hash: {e}")))?;

        if verify_off_thread(password.expose().to_string(), phc).await? {
            identity_from_row(&row)
        } else {
            Err(IdentityError::InvalidCredentials)
        }
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, uid: UserUid) -> Result<(), IdentityError> {
        let result = sqlx::query("DELETE FROM identities WHERE uid = $1")
            .bind(uid.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_identity", e))?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(email = %email), err)]
    async fn email_verification_link(&self, email: &Email) -> Result<String, IdentityError> {
        let token = Uuid::new_v4().simple().to_string();
        let result = sqlx::query("UPDATE identities SET verification_token = $2 WHERE email = $1")
            .bind(email.as_str())
            .bind(&token)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("email_verification_link", e))?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::NotFound);
        }
        Ok(verification_link(&self.base_url, &token))
    }
}
