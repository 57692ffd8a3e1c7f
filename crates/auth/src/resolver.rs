//! Role Resolver: the role a signup is stored with, and where a login lands.
//!
//! Both functions are total over their (closed) inputs and perform no IO.

use serde::Serialize;

use crate::{RequestedRole, Role};

/// Outcome of resolving a requested signup role.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SignupRoleDecision {
    pub stored_role: Role,
    /// An admin request must be written together with the profile.
    pub needs_admin_request: bool,
}

/// Decide which role a new profile is stored with.
///
/// Students and lecturers are admitted directly; an admin nomination is parked
/// at `pending_admin` until reviewed.
pub fn resolve_signup_role(requested: RequestedRole) -> SignupRoleDecision {
    match requested {
        RequestedRole::Student => SignupRoleDecision {
            stored_role: Role::Student,
            needs_admin_request: false,
        },
        RequestedRole::Lecturer => SignupRoleDecision {
            stored_role: Role::Lecturer,
            needs_admin_request: false,
        },
        RequestedRole::Admin => SignupRoleDecision {
            stored_role: Role::PendingAdmin,
            needs_admin_request: true,
        },
    }
}

/// Landing page after a successful login.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    StudentDashboard,
    LecturerDashboard,
    AdminDashboard,
}

impl Destination {
    pub const fn path(&self) -> &'static str {
        match self {
            Destination::StudentDashboard => "/student/dashboard",
            Destination::LecturerDashboard => "/lecturer/dashboard",
            Destination::AdminDashboard => "/admin/dashboard",
        }
    }
}

/// Why a login did not produce a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeniedReason {
    /// Admin nomination still under review. Informational, not a failure.
    ApprovalPending,
    /// Rejected nomination or a role the service does not recognise.
    Unauthorized,
}

impl DeniedReason {
    /// Message safe to show to the user.
    pub const fn user_message(&self) -> &'static str {
        match self {
            DeniedReason::ApprovalPending => {
                "Your admin request is awaiting approval. You will be able to log in once it is reviewed."
            }
            DeniedReason::Unauthorized => "You are not authorized to access this application.",
        }
    }
}

/// Map a stored role to a login outcome.
pub fn resolve_login_destination(stored: Role) -> Result<Destination, DeniedReason> {
    match stored {
        Role::Student => Ok(Destination::StudentDashboard),
        Role::Lecturer => Ok(Destination::LecturerDashboard),
        Role::Admin => Ok(Destination::AdminDashboard),
        Role::PendingAdmin => Err(DeniedReason::ApprovalPending),
        Role::RejectedAdmin => Err(DeniedReason::Unauthorized),
    }
}

/// Same as [`resolve_login_destination`] for a raw stored value; anything
/// unrecognised is `Unauthorized`.
pub fn resolve_stored_role(raw: &str) -> Result<Destination, DeniedReason> {
    match raw.parse::<Role>() {
        Ok(role) => resolve_login_destination(role),
        Err(_) => Err(DeniedReason::Unauthorized),
    }
}
