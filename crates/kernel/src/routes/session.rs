//! Session signals from the account collaborator.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::session::Account;
use crate::state::AppState;

/// Create the session router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/session/ready", post(ready))
        .route("/api/session/signed-out", post(signed_out))
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    epoch: u64,
    /// Whether this call started the remote loads.
    activated: bool,
}

/// The account is ready: start a new round of remote loads.
async fn ready(
    State(state): State<AppState>,
    Json(account): Json<Account>,
) -> AppResult<Json<ReadyResponse>> {
    if account.login.trim().is_empty() {
        return Err(AppError::BadRequest("login must not be empty".to_string()));
    }

    let epoch = state.session().mark_ready(account);
    let activated = state.aggregator().activate();
    Ok(Json(ReadyResponse { epoch, activated }))
}

/// The account signed out. Navigation is left as it is.
async fn signed_out(State(state): State<AppState>) -> StatusCode {
    state.session().sign_out();
    StatusCode::NO_CONTENT
}
