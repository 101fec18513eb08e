//! SSE framing of delivery events.
//!
//! A frame is `event: <name>\ndata: <json>\n\n`.

use axum::response::sse::Event;

use crate::event::DeliveryEvent;

/// Literal frame text, identical to what [`to_sse_event`] puts on the wire.
pub fn encode(event: &DeliveryEvent) -> String {
    format!("event: {}\ndata: {}\n\n", event.name(), event.data_json())
}

/// Convert a delivery event to an axum SSE event.
pub fn to_sse_event(event: &DeliveryEvent) -> Event {
    Event::default().event(event.name()).data(event.data_json())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_start_frame() {
        let frame = encode(&DeliveryEvent::Start { session_id: "abc".into(), streaming: true });
        assert_eq!(frame, "event: start\ndata: {\"sessionId\":\"abc\",\"streaming\":true}\n\n");
    }

    #[test]
    fn encode_error_frame() {
        let frame = encode(&DeliveryEvent::Error { message: "model overloaded".into() });
        assert_eq!(frame, "event: error\ndata: {\"error\":\"model overloaded\"}\n\n");
    }
}
