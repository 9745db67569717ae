//! HTTP route handlers.

pub mod gateway;
pub mod health;
pub mod locale;
pub mod metrics;
pub mod navigation;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Every route of the shell, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(navigation::router())
        .merge(session::router())
        .merge(locale::router())
        .merge(gateway::router())
        .merge(metrics::router())
}
