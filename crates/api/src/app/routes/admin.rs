//! Admin pages and the review actions.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::error;

use rolegate_auth::{ReviewDecision, Role};
use rolegate_core::UserUid;

use crate::app::dto::{Page, PendingCount, ProfileDetail, RequestDetail, RequestList, SessionView};
use crate::app::errors::{self, redirect_with_flash};
use crate::app::services::AppServices;
use crate::authz::{self, ADMIN_PAGES};
use crate::context::RequestContext;
use crate::cookies::Flash;

const REQUESTS_PAGE: &str = "/admin/requests";

pub fn router() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/requests", get(list_requests))
        .route("/request/:uid", get(request_detail))
        .route("/student/:uid", get(student_detail))
        .route("/lecturer/:uid", get(lecturer_detail))
        .route("/approve/:uid", post(approve))
        .route("/reject/:uid", post(reject))
}

macro_rules! guarded {
    ($ctx:expr, $services:expr) => {
        match authz::guard(&$ctx, ADMIN_PAGES, &$services.cookies) {
            Ok(session) => session,
            Err(redirect) => return redirect,
        }
    };
}

fn page<T: serde::Serialize>(page: &'static str, ctx: &RequestContext, body: T) -> Response {
    Json(Page {
        page,
        flash: ctx.flash().cloned(),
        session: ctx.session().map(SessionView::from),
        body,
    })
    .into_response()
}

/// GET /admin/dashboard
pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    guarded!(ctx, services);
    match services.accounts.list_pending_requests().await {
        Ok(pending) => page(
            "admin_dashboard",
            &ctx,
            PendingCount {
                pending_requests: pending.len(),
            },
        ),
        Err(e) => {
            error!(error = %e, "admin dashboard: pending requests unavailable");
            errors::unavailable()
        }
    }
}

/// GET /admin/requests
pub async fn list_requests(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    guarded!(ctx, services);
    match services.accounts.list_pending_requests().await {
        Ok(requests) => page("admin_requests", &ctx, RequestList { requests }),
        Err(e) => {
            error!(error = %e, "admin requests: list failed");
            errors::unavailable()
        }
    }
}

/// GET /admin/request/:uid
pub async fn request_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(uid): Path<String>,
) -> Response {
    guarded!(ctx, services);
    let Ok(uid) = uid.parse::<UserUid>() else {
        return errors::not_found("Admin request not found.");
    };
    match services.accounts.admin_request(uid).await {
        Ok(Some((request, profile))) => page("admin_request", &ctx, RequestDetail { request, profile }),
        Ok(None) => errors::not_found("Admin request not found."),
        Err(e) => {
            error!(uid = %uid, error = %e, "admin request view failed");
            errors::unavailable()
        }
    }
}

/// GET /admin/student/:uid
pub async fn student_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(uid): Path<String>,
) -> Response {
    guarded!(ctx, services);
    profile_view("admin_student", &ctx, &services, &uid, Role::Student, "Student not found.").await
}

/// GET /admin/lecturer/:uid
pub async fn lecturer_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(uid): Path<String>,
) -> Response {
    guarded!(ctx, services);
    profile_view("admin_lecturer", &ctx, &services, &uid, Role::Lecturer, "Lecturer not found.").await
}

async fn profile_view(
    name: &'static str,
    ctx: &RequestContext,
    services: &AppServices,
    raw_uid: &str,
    role: Role,
    missing: &'static str,
) -> Response {
    let Ok(uid) = raw_uid.parse::<UserUid>() else {
        return errors::not_found(missing);
    };
    match services.accounts.profile_with_role(uid, role).await {
        Ok(Some(profile)) => page(name, ctx, ProfileDetail { profile }),
        Ok(None) => errors::not_found(missing),
        Err(e) => {
            error!(uid = %uid, error = %e, "profile view failed");
            errors::unavailable()
        }
    }
}

/// POST /admin/approve/:uid
pub async fn approve(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(uid): Path<String>,
) -> Response {
    let reviewer = guarded!(ctx, services);
    review(&services, reviewer, &uid, ReviewDecision::Approve).await
}

/// POST /admin/reject/:uid
pub async fn reject(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(uid): Path<String>,
) -> Response {
    let reviewer = guarded!(ctx, services);
    review(&services, reviewer, &uid, ReviewDecision::Reject).await
}

async fn review(
    services: &AppServices,
    reviewer: &rolegate_auth::SessionContext,
    raw_uid: &str,
    decision: ReviewDecision,
) -> Response {
    let flash = match raw_uid.parse::<UserUid>() {
        Err(_) => Flash::error("Admin request not found."),
        Ok(uid) => match services.accounts.review(uid, decision, reviewer).await {
            Ok(request) => Flash::success(match decision {
                ReviewDecision::Approve => format!("{} approved as admin.", request.email),
                ReviewDecision::Reject => format!("Admin request from {} rejected.", request.email),
            }),
            Err(err) => Flash::error(err.user_message(decision)),
        },
    };
    redirect_with_flash(REQUESTS_PAGE, flash, &services.cookies)
}
