//! Lifecycle events a producer emits into a sink.

use serde::Serialize;

/// One lifecycle event of a delivery session.
///
/// Within a session the order is `Start`, any number of `Chunk`s, then exactly
/// one of `Finish` / `Error`. `accumulated` is the running concatenation of every
/// `text` seen so far, not a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryEvent {
    Start { session_id: String, streaming: bool },
    Chunk { text: String, accumulated: String },
    Finish { complete: bool, session_id: String },
    Error { message: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartData<'a> {
    session_id: &'a str,
    streaming: bool,
}

#[derive(Serialize)]
struct ChunkData<'a> {
    text: &'a str,
    accumulated: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FinishData<'a> {
    complete: bool,
    session_id: &'a str,
}

#[derive(Serialize)]
struct ErrorData<'a> {
    error: &'a str,
}

impl DeliveryEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            DeliveryEvent::Start { .. } => "start",
            DeliveryEvent::Chunk { .. } => "chunk",
            DeliveryEvent::Finish { .. } => "finish",
            DeliveryEvent::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryEvent::Finish { .. } | DeliveryEvent::Error { .. })
    }

    /// Single-line JSON object carried in the frame's `data` field.
    pub fn data_json(&self) -> String {
        let encoded = match self {
            DeliveryEvent::Start { session_id, streaming } => serde_json::to_string(&StartData {
                session_id,
                streaming: *streaming,
            }),
            DeliveryEvent::Chunk { text, accumulated } => {
                serde_json::to_string(&ChunkData { text, accumulated })
            }
            DeliveryEvent::Finish { complete, session_id } => serde_json::to_string(&FinishData {
                complete: *complete,
                session_id,
            }),
            DeliveryEvent::Error { message } => serde_json::to_string(&ErrorData { error: message }),
        };
        // Borrowed strings and bools always serialize.
        encoded.unwrap_or_else(|_| "{}".to_string())
    }
}
