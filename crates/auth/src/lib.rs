//! `rolegate-auth`: pure role-admission and authorization logic.
//!
//! No HTTP and no storage: everything here is a deterministic function of
//! its inputs (timestamps are passed in).

pub mod admin_request;
pub mod authorize;
pub mod profile;
pub mod resolver;
pub mod roles;
pub mod session;
pub mod signup;

pub use admin_request::{AdminRequest, RequestStatus, ReviewDecision, ReviewOutcome, WorkflowError};
pub use authorize::{GuardError, RoleSet, authorize, require_authenticated, require_role};
pub use profile::{Gender, Profile};
pub use resolver::{
    DeniedReason, Destination, SignupRoleDecision, resolve_login_destination,
    resolve_signup_role, resolve_stored_role,
};
pub use roles::{RequestedRole, Role, RoleParseError};
pub use session::{SessionContext, SessionValidationError};
pub use signup::{FieldError, Password, SignupForm, ValidatedSignup, ValidationErrors};
