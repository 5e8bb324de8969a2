// HTTP server: router, auth middleware and REST handlers

pub mod app;
pub mod middleware;
pub mod routes;

pub use app::{build_app, AppState, HttpSettings};
