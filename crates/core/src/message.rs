use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mail message as handed over by a mail source.
///
/// Only the envelope fields the pipeline logs or indexes on are typed; everything
/// else the source returns travels untouched in `payload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Message {
    /// Minimal message with only an id; used by sources that fill fields lazily.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            thread_id: None,
            from: None,
            subject: None,
            snippet: None,
            received_at: None,
            labels: Vec::new(),
            payload: serde_json::Value::Null,
        }
    }
}

/// One fetched group of messages, persisted as a unit.
pub type IngestionBatch = Vec<Message>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_json_fills_defaults() {
        let msg: Message = serde_json::from_str(r#"{"id":"m-1"}"#).unwrap();
        assert_eq!(msg, Message::with_id("m-1"));
    }

    #[test]
    fn unknown_shape_is_kept_in_payload() {
        let json = r#"{"id":"m-2","subject":"hi","payload":{"parts":[{"mimeType":"text/plain"}]}}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.subject.as_deref(), Some("hi"));
        assert_eq!(msg.payload["parts"][0]["mimeType"], "text/plain");
    }

    #[test]
    fn absent_options_are_not_serialized() {
        let json = serde_json::to_string(&Message::with_id("m-3")).unwrap();
        assert!(!json.contains("thread_id"));
        assert!(!json.contains("received_at"));
    }
}
