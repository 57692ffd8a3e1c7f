use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use rolegate_core::SessionId;
use rolegate_infra::SessionStore;

use crate::context::RequestContext;
use crate::cookies::{self, CookiePolicy, FLASH_COOKIE, Flash, SESSION_COOKIE};

#[derive(Clone)]
pub struct SessionState {
    pub sessions: Arc<dyn SessionStore>,
    pub cookies: CookiePolicy,
}

/// Resolve the session cookie into a [`RequestContext`] and retire the flash
/// cookie once a non-redirect response has shown it.
pub async fn session_middleware(
    State(state): State<SessionState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let headers = req.headers();

    let session = cookies::read(headers, SESSION_COOKIE)
        .and_then(|raw| raw.parse::<SessionId>().ok())
        .and_then(|id| state.sessions.get(&id, Utc::now()).map(|s| (id, s)));
    let flash = cookies::read(headers, FLASH_COOKIE).and_then(|raw| Flash::decode(&raw));
    let had_flash = flash.is_some();

    if let Some((_, s)) = &session {
        debug!(uid = %s.uid, role = %s.role, "request has live session");
    }
    req.extensions_mut().insert(RequestContext::new(session, flash));

    let mut response = next.run(req).await;

    if had_flash && !response.status().is_redirection() {
        if let Ok(value) = HeaderValue::from_str(&state.cookies.clear_flash()) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}
