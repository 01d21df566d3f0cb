//! Auth check state endpoint.

use axum::{extract::State, routing::get, Json, Router};

use crate::gate::AuthSnapshot;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/state", get(auth_state))
}

/// Current phase, identity and completion time. Never waits for the check.
async fn auth_state(State(state): State<AppState>) -> Json<AuthSnapshot> {
    Json(state.auth.snapshot())
}
