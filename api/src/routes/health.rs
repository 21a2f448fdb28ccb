use axum::{Json, Router, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

pub const LIVENESS_TEXT: &str = "MCP tool server is live";

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health_check))
}

/// Plain-text liveness probe
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Server is running", body = String, content_type = "text/plain")),
    tag = "system"
)]
pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// Health check endpoint. The server has no backing store, so reaching it means healthy.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
