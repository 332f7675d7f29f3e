//! Health check endpoints.

use std::time::Duration;

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

const READINESS_TIMEOUT: Duration = Duration::from_secs(1);

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the document stores cannot be read
/// within a second (a writer is stuck holding the lock).
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let probe = async {
        state.carts().user_count().await;
        state.wishlists().user_count().await;
    };
    match tokio::time::timeout(READINESS_TIMEOUT, probe).await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
