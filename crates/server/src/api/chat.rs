//! Chat endpoints: one producer, two delivery modes.
//!
//! `POST /chat/stream` relays generated text live as SSE frames through a
//! [`StreamSink`]; `POST /chat` relays the same producer into a [`CollectSink`]
//! and answers once with the full text.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use mailpipe_delivery::{relay, CollectSink, RelayOutcome, StreamSink};

use crate::generator::GenerateError;
use crate::state::AppState;

use super::{api_error, ApiError, ErrorResponse};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub prompt: String,
    /// Reused when given; a fresh UUID otherwise.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub session_id: String,
    pub text: String,
}

fn generate_error(e: GenerateError) -> ApiError {
    match e {
        GenerateError::EmptyPrompt => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        GenerateError::Backend(_) => api_error(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}

fn session_id_or_new(session_id: Option<String>) -> String {
    session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Stream a chat reply as Server-Sent Events
///
/// Events emitted, in order:
/// - `start`  -- `{sessionId, streaming}`
/// - `chunk`  -- `{text, accumulated}` per generated delta
/// - `finish` -- `{complete, sessionId}`, or
/// - `error`  -- `{error}` if generation fails mid-stream
///
/// The response ends right after the terminal event.
#[utoipa::path(
    post,
    path = "/chat/stream",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "SSE stream of delivery events", content_type = "text/event-stream"),
        (status = 400, description = "Empty prompt", body = ErrorResponse)
    )
)]
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let deltas = state.generator.generate(&req.prompt).map_err(generate_error)?;
    let session_id = session_id_or_new(req.session_id);
    let (mut sink, frames) = StreamSink::channel(session_id.clone());

    // Produce in the background; the response body drains the transport.
    tokio::spawn(async move {
        match relay(&mut sink, &session_id, deltas).await {
            Ok(RelayOutcome::Completed { text }) => {
                info!(session = %session_id, chars = text.len(), "chat stream completed");
            }
            Ok(RelayOutcome::Failed { message, .. }) => {
                warn!(session = %session_id, error = %message, "chat stream ended with error event");
            }
            Err(e) => {
                warn!(session = %session_id, error = %e, "chat stream aborted");
            }
        }
    });

    Ok(frames.into_sse())
}

/// Chat reply as a single JSON body
#[utoipa::path(
    post,
    path = "/chat",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Full generated text", body = ChatResponse),
        (status = 400, description = "Empty prompt", body = ErrorResponse),
        (status = 502, description = "Generation failed", body = ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let deltas = state.generator.generate(&req.prompt).map_err(generate_error)?;
    let session_id = session_id_or_new(req.session_id);
    let mut sink = CollectSink::new();

    match relay(&mut sink, &session_id, deltas).await {
        Ok(RelayOutcome::Completed { .. }) => Ok(Json(ChatResponse {
            session_id,
            text: sink.full_text().to_string(),
        })),
        Ok(RelayOutcome::Failed { message, .. }) => Err(api_error(StatusCode::BAD_GATEWAY, message)),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}
