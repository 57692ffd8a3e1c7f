use axum::{Router, routing::get};

pub mod account;
pub mod admin;
pub mod dashboards;
pub mod system;

/// Router for every page behind the session middleware.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::home))
        .merge(account::router())
        .merge(dashboards::router())
        .nest("/admin", admin::router())
}
