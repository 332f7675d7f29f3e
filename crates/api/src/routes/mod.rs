//! HTTP route handlers for the collections API.

pub mod collections;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the collections router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api/user/{uid}/{kind}", get(collections::list))
        .route("/api/user/{uid}/{kind}/add", post(collections::add))
        .route("/api/user/{uid}/{kind}/remove", post(collections::remove))
        .fallback(not_found)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("no such endpoint".to_string())
}
