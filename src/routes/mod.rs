//! HTTP route definitions and handlers.
//!
//! Operational endpoints (health, metrics, auth state) are routed directly; every other
//! request is treated as a navigation and runs through the middleware chain.

mod health_routes;
mod metrics_routes;
mod navigation_routes;
mod state_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes::routes())
        .merge(metrics_routes::routes())
        .merge(state_routes::routes())
        .fallback(navigation_routes::navigate)
        .with_state(state)
}
