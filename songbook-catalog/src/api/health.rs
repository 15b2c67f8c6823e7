//! Health check endpoint

use axum::{routing::get, Json, Router};
use songbook_common::api::HealthResponse;

use crate::AppState;

/// GET /api/health-check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    ))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health-check", get(health_check))
}
