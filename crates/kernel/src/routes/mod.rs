//! HTTP route handlers.

pub mod access_admin;
pub mod auth;
pub mod blog;
pub mod health;
pub mod helpers;
pub mod user_admin;

use axum::Router;

use crate::state::AppState;

/// Assemble the application router.
///
/// Middleware (sessions, CORS, tracing) is layered on by the caller: the
/// binary wires the Redis session store, tests wire an in-memory one.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(blog::router())
        .merge(access_admin::router())
        .merge(user_admin::router())
        .with_state(state)
}
