//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "mailpipe API",
        version = "0.1.0",
        description = "Incremental chat delivery (SSE or collected) and background mail ingestion.",
    ),
    tags(
        (name = "Health", description = "Liveness and configuration summary"),
        (name = "Chat", description = "Generated text delivered live over SSE or as one JSON body"),
        (name = "Ingestion", description = "Fire-and-forget mail ingestion jobs"),
        (name = "MCP", description = "Configured MCP server endpoints"),
    ),
    paths(
        crate::api::health::health,
        crate::api::chat::chat_stream,
        crate::api::chat::chat,
        crate::api::ingest::ingest,
        crate::api::mcp::mcp_servers,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::chat::ChatRequest,
        crate::api::chat::ChatResponse,
        crate::api::ingest::IngestRequest,
        crate::api::ingest::IngestAccepted,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in ["/health", "/chat", "/chat/stream", "/ingest", "/mcp/servers"] {
            assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
        }
    }
}
