//! Gateway route table endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::gateway::RouteTableSnapshot;
use crate::state::AppState;

/// Create the gateway router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/gateway/routes", get(routes))
        .route("/api/gateway/routes/refresh", post(refresh))
}

/// Current route table and whether a refresh is in flight.
async fn routes(State(state): State<AppState>) -> Json<RouteTableSnapshot> {
    Json(state.gateway().snapshot())
}

/// Start a refresh. The response shows `updating: true`; poll `routes` for
/// the result.
async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<RouteTableSnapshot>) {
    state.gateway().spawn_refresh();
    (StatusCode::ACCEPTED, Json(state.gateway().snapshot()))
}
