use std::sync::Arc;

use axum::{Extension, Json, Router, response::IntoResponse, response::Response, routing::get};

use crate::app::dto::{Empty, Page, SessionView};
use crate::app::services::AppServices;
use crate::authz::{self, LECTURER_PAGES, STUDENT_PAGES};
use crate::context::RequestContext;

pub fn router() -> Router {
    Router::new()
        .route("/student/dashboard", get(student))
        .route("/lecturer/dashboard", get(lecturer))
}

/// GET /student/dashboard
pub async fn student(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    dashboard("student_dashboard", &ctx, &services, STUDENT_PAGES)
}

/// GET /lecturer/dashboard
pub async fn lecturer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    dashboard("lecturer_dashboard", &ctx, &services, LECTURER_PAGES)
}

fn dashboard(
    page: &'static str,
    ctx: &RequestContext,
    services: &AppServices,
    allowed: rolegate_auth::RoleSet,
) -> Response {
    let session = match authz::guard(ctx, allowed, &services.cookies) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };

    Json(Page {
        page,
        flash: ctx.flash().cloned(),
        session: Some(SessionView::from(session)),
        body: Empty {},
    })
    .into_response()
}
