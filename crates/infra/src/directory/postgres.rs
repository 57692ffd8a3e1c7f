//! Postgres-backed directory.
//!
//! Paired writes run inside one transaction. Reviews use a conditional
//! `UPDATE … WHERE status = 'pending'` so two concurrent reviewers cannot both
//! win; the loser sees `StoreError::Conflict` and nothing of its write lands.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{error, instrument};
use uuid::Uuid;

use rolegate_auth::{AdminRequest, Gender, Profile, RequestStatus, ReviewOutcome, Role};
use rolegate_core::{Email, UserUid};

use super::{DirectoryStore, StoreError, check_new_profile};

/// Tables used by the Postgres identity provider and directory.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS identities (
    uid                 UUID PRIMARY KEY,
    email               TEXT NOT NULL UNIQUE,
    password_hash       TEXT NOT NULL,
    verification_token  TEXT,
    created_at          TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    uid            UUID PRIMARY KEY,
    email          TEXT NOT NULL UNIQUE,
    role           TEXT NOT NULL,
    gender         TEXT,
    date_of_birth  DATE,
    created_at     TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS admin_requests (
    uid             UUID PRIMARY KEY REFERENCES users (uid),
    seq             BIGSERIAL NOT NULL,
    email           TEXT NOT NULL,
    requested_role  TEXT NOT NULL,
    status          TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected')),
    requested_by    UUID NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL,
    approved_by     UUID,
    approved_at     TIMESTAMPTZ,
    rejected_by     UUID,
    rejected_at     TIMESTAMPTZ
);

CREATE INDEX IF NOT EXISTS admin_requests_pending_idx
    ON admin_requests (seq) WHERE status = 'pending';
"#;

#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: Arc<PgPool>,
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // unique violation
                Some("23505") => StoreError::Conflict(msg),
                // foreign key / check violation
                Some("23503") | Some("23514") => StoreError::Invariant(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Backend(format!("failed to read {name}: {e}")))
}

fn parse_email(raw: &str) -> Result<Email, StoreError> {
    Email::parse(raw).map_err(|e| StoreError::Backend(format!("stored email invalid: {e}")))
}

fn profile_from_row(row: &PgRow) -> Result<Profile, StoreError> {
    let uid = UserUid::from_uuid(column::<Uuid>(row, "uid")?);
    let raw_role: String = column(row, "role")?;
    let role = raw_role
        .parse::<Role>()
        .map_err(|_| StoreError::UnrecognizedRole { uid, role: raw_role.clone() })?;
    let gender = column::<Option<String>>(row, "gender")?
        .map(|g| g.parse::<Gender>())
        .transpose()
        .map_err(|e| StoreError::Backend(format!("stored gender invalid: {e}")))?;

    Ok(Profile {
        uid,
        email: parse_email(&column::<String>(row, "email")?)?,
        role,
        gender,
        date_of_birth: column::<Option<NaiveDate>>(row, "date_of_birth")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

fn request_from_row(row: &PgRow) -> Result<AdminRequest, StoreError> {
    let uid = UserUid::from_uuid(column::<Uuid>(row, "uid")?);
    let requested_role: String = column(row, "requested_role")?;
    let status: String = column(row, "status")?;
    let opt_uid = |name: &str| -> Result<Option<UserUid>, StoreError> {
        Ok(column::<Option<Uuid>>(row, name)?.map(UserUid::from_uuid))
    };

    Ok(AdminRequest {
        uid,
        email: parse_email(&column::<String>(row, "email")?)?,
        requested_role: requested_role
            .parse::<Role>()
            .map_err(|_| StoreError::UnrecognizedRole { uid, role: requested_role.clone() })?,
        status: status
            .parse::<RequestStatus>()
            .map_err(|e| StoreError::Backend(e.to_string()))?,
        requested_by: UserUid::from_uuid(column::<Uuid>(row, "requested_by")?),
        created_at: column(row, "created_at")?,
        approved_by: opt_uid("approved_by")?,
        approved_at: column(row, "approved_at")?,
        rejected_by: opt_uid("rejected_by")?,
        rejected_at: column(row, "rejected_at")?,
    })
}

const REQUEST_COLUMNS: &str = "uid, email, requested_role, status, requested_by, created_at, \
                               approved_by, approved_at, rejected_by, rejected_at";

async fn insert_request(tx: &mut Transaction<'_, Postgres>, req: &AdminRequest) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO admin_requests (uid, email, requested_role, status, requested_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(req.uid.as_uuid())
    .bind(req.email.as_str())
    .bind(req.requested_role.as_str())
    .bind(req.status.as_str())
    .bind(req.requested_by.as_uuid())
    .bind(req.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_admin_request", e))?;
    Ok(())
}

#[async_trait]
impl DirectoryStore for PostgresDirectory {
    #[instrument(skip(self), fields(uid = %uid), err)]
    async fn get_profile(&self, uid: UserUid) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query(
            "SELECT uid, email, role, gender, date_of_birth, created_at FROM users WHERE uid = $1",
        )
        .bind(uid.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_profile", e))?;

        row.as_ref().map(profile_from_row).transpose()
    }

    #[instrument(skip(self, profile, request), fields(uid = %profile.uid, role = %profile.role), err)]
    async fn create_profile(&self, profile: Profile, request: Option<AdminRequest>) -> Result<(), StoreError> {
        check_new_profile(&profile, request.as_ref())?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO users (uid, email, role, gender, date_of_birth, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(profile.uid.as_uuid())
        .bind(profile.email.as_str())
        .bind(profile.role.as_str())
        .bind(profile.gender.map(|g| g.as_str()))
        .bind(profile.date_of_birth)
        .bind(profile.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_profile", e))?;

        if let Some(req) = &request {
            insert_request(&mut tx, req).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(uid = %uid), err)]
    async fn get_admin_request(&self, uid: UserUid) -> Result<Option<AdminRequest>, StoreError> {
        let row = sqlx::query(&format!("SELECT {REQUEST_COLUMNS} FROM admin_requests WHERE uid = $1"))
            .bind(uid.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_admin_request", e))?;

        row.as_ref().map(request_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_pending_requests(&self) -> Result<Vec<AdminRequest>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM admin_requests WHERE status = 'pending' ORDER BY seq"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_pending_requests", e))?;

        rows.iter().map(request_from_row).collect()
    }

    #[instrument(
        skip(self, outcome),
        fields(uid = %outcome.request.uid, status = %outcome.request.status, role = %outcome.profile_role),
        err
    )]
    async fn record_review(&self, outcome: &ReviewOutcome) -> Result<(), StoreError> {
        let req = &outcome.request;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE admin_requests
            SET status = $2, approved_by = $3, approved_at = $4, rejected_by = $5, rejected_at = $6
            WHERE uid = $1 AND status = 'pending'
            "#,
        )
        .bind(req.uid.as_uuid())
        .bind(req.status.as_str())
        .bind(req.approved_by.map(|u| *u.as_uuid()))
        .bind(req.approved_at)
        .bind(req.rejected_by.map(|u| *u.as_uuid()))
        .bind(req.rejected_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_admin_request", e))?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "admin request {} is missing or no longer pending",
                req.uid
            )));
        }

        let updated = sqlx::query("UPDATE users SET role = $2 WHERE uid = $1")
            .bind(req.uid.as_uuid())
            .bind(outcome.profile_role.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_profile_role", e))?;

        if updated.rows_affected() == 0 {
            // Dropping `tx` rolls the request update back.
            error!(uid = %req.uid, "admin request has no profile; review rolled back");
            return Err(StoreError::Invariant(format!("admin request {} has no profile", req.uid)));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }
}
