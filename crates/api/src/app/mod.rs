//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: collaborator wiring (in-memory or Postgres)
//! - `routes/`: handlers, one file per area
//! - `dto.rs`: page views and form bodies
//! - `errors.rs`: redirect-with-flash and JSON error helpers

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware::{self, SessionState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices) -> Router {
    let session_state = SessionState {
        sessions: services.sessions.clone(),
        cookies: services.cookies,
    };

    let pages = routes::router()
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(
            session_state,
            middleware::session_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(pages)
        .layer(ServiceBuilder::new())
}
