use axum::{Extension, Json, http::StatusCode};

use crate::app::dto::{Empty, Page, SessionView};
use crate::context::RequestContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn home(Extension(ctx): Extension<RequestContext>) -> Json<Page<Empty>> {
    Json(Page {
        page: "home",
        flash: ctx.flash().cloned(),
        session: ctx.session().map(SessionView::from),
        body: Empty {},
    })
}
