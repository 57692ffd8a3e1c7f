//! HTTP API: server, routing, sessions, and request/response mapping.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod cookies;
pub mod middleware;
