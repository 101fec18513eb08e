//! HTTP handlers, grouped by concern.

pub mod chat;
pub mod doc;
pub mod health;
pub mod ingest;
pub mod mcp;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

pub use chat::{chat, chat_stream};
pub use health::health;
pub use ingest::ingest;
pub use mcp::mcp_servers;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into() }))
}
