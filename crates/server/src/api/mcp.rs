//! MCP endpoint registry listing.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use mailpipe_core::McpServerEntry;

use crate::state::AppState;

/// List configured MCP servers
///
/// Returns the registry in configuration order.
#[utoipa::path(
    get,
    path = "/mcp/servers",
    tag = "MCP",
    responses((status = 200, description = "Configured MCP servers", body = Object))
)]
pub async fn mcp_servers(State(state): State<Arc<AppState>>) -> Json<Vec<McpServerEntry>> {
    Json(state.mcp.servers().to_vec())
}
