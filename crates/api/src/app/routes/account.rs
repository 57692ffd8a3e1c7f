//! Signup, login, and logout.

use std::sync::Arc;

use axum::{
    Extension, Form, Json, Router,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::get,
};
use tracing::{error, info};

use rolegate_auth::{DeniedReason, Password, SignupForm};
use rolegate_infra::{LoginError, SessionStore};

use crate::app::dto::{FormFields, LoginForm, Page, SessionView};
use crate::app::errors::redirect_with_flash;
use crate::app::services::AppServices;
use crate::context::RequestContext;
use crate::cookies::Flash;

const SIGNUP_FIELDS: &[&str] = &["email", "password", "confirm", "role", "gender", "date_of_birth"];
const LOGIN_FIELDS: &[&str] = &["email", "password"];

pub fn router() -> Router {
    Router::new()
        .route("/signup", get(signup_page).post(signup))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

fn form_page(page: &'static str, action: &'static str, fields: &'static [&'static str], ctx: &RequestContext) -> Response {
    Json(Page {
        page,
        flash: ctx.flash().cloned(),
        session: ctx.session().map(SessionView::from),
        body: FormFields { fields, action },
    })
    .into_response()
}

/// GET /signup
pub async fn signup_page(Extension(ctx): Extension<RequestContext>) -> Response {
    form_page("signup", "/signup", SIGNUP_FIELDS, &ctx)
}

/// POST /signup
pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Form(form): Form<SignupForm>,
) -> Response {
    match services.accounts.signup(&form).await {
        Ok(outcome) => redirect_with_flash(
            "/login",
            Flash::success(outcome.user_message()),
            &services.cookies,
        ),
        Err(err) => {
            info!(error = %err, "signup refused");
            redirect_with_flash("/signup", Flash::error(err.user_message()), &services.cookies)
        }
    }
}

/// GET /login
pub async fn login_page(Extension(ctx): Extension<RequestContext>) -> Response {
    form_page("login", "/login", LOGIN_FIELDS, &ctx)
}

/// POST /login
///
/// Any session the client already holds is dropped first, so a fresh id is
/// issued on every successful login.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Some(old) = ctx.session_id() {
        services.sessions.remove(&old);
    }

    let password = Password::new(form.password);
    let issued = services.accounts.login(&form.email, &password).await.and_then(|success| {
        let destination = success.destination;
        services
            .sessions
            .insert(success.session)
            .map(|id| (id, destination))
            .ok_or_else(|| {
                error!("login: session store refused the new session");
                LoginError::Unavailable("session store unavailable".into())
            })
    });
    match issued {
        Ok((id, destination)) => {
            let flash = Flash::success("Logged in successfully.");
            (
                AppendHeaders([
                    (SET_COOKIE, services.cookies.session(id)),
                    (SET_COOKIE, services.cookies.flash(&flash)),
                ]),
                Redirect::to(destination.path()),
            )
                .into_response()
        }
        Err(err) => {
            let flash = match &err {
                LoginError::Denied(DeniedReason::ApprovalPending) => {
                    Flash::info(err.user_message())
                }
                _ => Flash::error(err.user_message()),
            };
            (
                AppendHeaders([
                    (SET_COOKIE, services.cookies.clear_session()),
                    (SET_COOKIE, services.cookies.flash(&flash)),
                ]),
                Redirect::to("/login"),
            )
                .into_response()
        }
    }
}

/// GET /logout
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    if let Some(id) = ctx.session_id() {
        if let Some(session) = services.sessions.remove(&id) {
            info!(uid = %session.uid, "logged out");
        }
    }
    let flash = Flash::success("You have been logged out.");
    (
        AppendHeaders([
            (SET_COOKIE, services.cookies.clear_session()),
            (SET_COOKIE, services.cookies.flash(&flash)),
        ]),
        Redirect::to("/"),
    )
        .into_response()
}
