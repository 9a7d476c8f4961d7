//! Route definitions for the helpdesk HTTP API.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(admin_routes())
        .merge(health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Staff area entry points.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/login",
            get(handlers::login::login_get).post(handlers::login::login_post),
        )
        .route("/admin/login/image", get(handlers::login::challenge_image))
        .route("/admin/session", get(handlers::session::whoami))
}

/// Liveness endpoint.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
