//! Health check endpoint.
//!
//! Always 200 while the process is serving: a broken remote degrades the
//! navigation, it does not make the shell unhealthy. The per-source summary
//! is informational.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::menu::LoadState;
use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    sources: usize,
    loaded: usize,
    failed: usize,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let statuses = state.aggregator().registry().statuses();
    let count = |wanted: LoadState| statuses.iter().filter(|s| s.state == wanted).count();

    Json(HealthResponse {
        status: "healthy",
        sources: statuses.len(),
        loaded: count(LoadState::Loaded),
        failed: count(LoadState::Failed),
    })
}

/// Create the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
