//! Admin Request workflow (admin self-nomination review).
//!
//! # Invariants
//! - A request exists iff its profile's role is or was `pending_admin`.
//! - `pending` is the only state with outgoing transitions; `approved` and
//!   `rejected` are terminal.
//! - A transition always yields the request *and* the profile role that must
//!   be written with it, so callers cannot apply one without the other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rolegate_core::{Email, UserUid};

use crate::Role;

/// Review status of an admin request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl core::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for RequestStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(WorkflowError::UnknownStatus(other.to_string())),
        }
    }
}

/// A reviewer's verdict.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub const fn resulting_status(&self) -> RequestStatus {
        match self {
            ReviewDecision::Approve => RequestStatus::Approved,
            ReviewDecision::Reject => RequestStatus::Rejected,
        }
    }

    /// Role the owning profile moves to.
    pub const fn resulting_role(&self) -> Role {
        match self {
            ReviewDecision::Approve => Role::Admin,
            ReviewDecision::Reject => Role::RejectedAdmin,
        }
    }
}

/// Workflow record for an admin nomination, keyed by the nominee's UID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRequest {
    pub uid: UserUid,
    pub email: Email,
    pub requested_role: Role,
    pub status: RequestStatus,
    pub requested_by: UserUid,
    pub created_at: DateTime<Utc>,
    pub approved_by: Option<UserUid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<UserUid>,
    pub rejected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("admin request for {uid} is already {status}")]
    NotPending { uid: UserUid, status: RequestStatus },

    #[error("unknown request status '{0}'")]
    UnknownStatus(String),
}

/// Result of a review: the updated request plus the role its profile must take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub request: AdminRequest,
    pub profile_role: Role,
}

impl AdminRequest {
    /// Initial state, created together with a `pending_admin` profile.
    pub fn pending(uid: UserUid, email: Email, created_at: DateTime<Utc>) -> Self {
        Self {
            uid,
            email,
            requested_role: Role::Admin,
            status: RequestStatus::Pending,
            requested_by: uid,
            created_at,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn approve(&self, approver: UserUid, at: DateTime<Utc>) -> Result<ReviewOutcome, WorkflowError> {
        self.review(ReviewDecision::Approve, approver, at)
    }

    pub fn reject(&self, rejecter: UserUid, at: DateTime<Utc>) -> Result<ReviewOutcome, WorkflowError> {
        self.review(ReviewDecision::Reject, rejecter, at)
    }

    /// Apply a verdict. Only a pending request can be reviewed; re-reviewing
    /// is refused rather than silently overwriting the first reviewer.
    pub fn review(
        &self,
        decision: ReviewDecision,
        reviewer: UserUid,
        at: DateTime<Utc>,
    ) -> Result<ReviewOutcome, WorkflowError> {
        if self.status.is_terminal() {
            return Err(WorkflowError::NotPending {
                uid: self.uid,
                status: self.status,
            });
        }

        let mut request = self.clone();
        request.status = decision.resulting_status();
        match decision {
            ReviewDecision::Approve => {
                request.approved_by = Some(reviewer);
                request.approved_at = Some(at);
            }
            ReviewDecision::Reject => {
                request.rejected_by = Some(reviewer);
                request.rejected_at = Some(at);
            }
        }

        Ok(ReviewOutcome {
            request,
            profile_role: decision.resulting_role(),
        })
    }
}
