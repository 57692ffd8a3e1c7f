//! Route-level authorization.
//!
//! Each protected handler names its allowed [`RoleSet`] and calls [`guard`]
//! before doing any work. Failures become redirects, never error pages.

use axum::response::Response;
use tracing::info;

use rolegate_auth::{GuardError, Role, RoleSet, SessionContext, authorize};

use crate::app::errors::redirect_with_flash;
use crate::context::RequestContext;
use crate::cookies::{CookiePolicy, Flash};

pub const STUDENT_PAGES: RoleSet = RoleSet::only(Role::Student);
pub const LECTURER_PAGES: RoleSet = RoleSet::only(Role::Lecturer).with(Role::Admin);
pub const ADMIN_PAGES: RoleSet = RoleSet::only(Role::Admin);

/// Where a guard failure sends the user.
pub fn redirect_target(err: &GuardError) -> &'static str {
    match err {
        GuardError::Unauthenticated => "/login",
        GuardError::Forbidden { .. } => "/",
    }
}

/// Check the request's session against `allowed`.
pub fn guard<'a>(
    ctx: &'a RequestContext,
    allowed: RoleSet,
    cookies: &CookiePolicy,
) -> Result<&'a SessionContext, Response> {
    authorize(ctx.session(), allowed).map_err(|err| {
        info!(?err, allowed = ?allowed.roles(), "guard: request refused");
        redirect_with_flash(redirect_target(&err), Flash::error(err.user_message()), cookies)
    })
}
