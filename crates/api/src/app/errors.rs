use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use serde_json::json;

use crate::cookies::{CookiePolicy, Flash};

/// 303 to `to`, carrying `flash` for the next page.
pub fn redirect_with_flash(to: &str, flash: Flash, cookies: &CookiePolicy) -> Response {
    (AppendHeaders([(SET_COOKIE, cookies.flash(&flash))]), Redirect::to(to)).into_response()
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn not_found(message: &'static str) -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", message)
}

/// Store failure on a read-only view; detail stays in the log.
pub fn unavailable() -> Response {
    json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "unavailable",
        "Something went wrong. Please try again.",
    )
}
