//! Liveness and configuration summary.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub generator: String,
    pub mcp_servers: usize,
    #[schema(value_type = Object)]
    pub config: serde_json::Value,
}

/// Service health
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        generator: state.generator.name().to_string(),
        mcp_servers: state.mcp.len(),
        config: state.config.redacted_summary(),
    })
}
