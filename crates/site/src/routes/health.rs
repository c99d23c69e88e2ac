//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn live() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Runs the environment guard. Returns 503 Service Unavailable if the
/// contact pipeline would refuse requests.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    let config = state.config();
    match config.environment.guard(config.mode) {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
