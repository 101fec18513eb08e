//! Live delivery over a Server-Sent Events transport.
//!
//! The transport is an unbounded channel whose receiving half becomes the body of
//! an axum [`Sse`] response. Writes are queued without waiting for the peer to
//! flush; wire order equals call order because a single producer owns the sink.
//! The terminal event drops the sending half, which ends the response.

use std::convert::Infallible;

use axum::response::sse::{Event, Sse};
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::event::DeliveryEvent;
use crate::frame::to_sse_event;
use crate::sink::{DeliveryError, DeliverySink, SinkState};

/// Sink bound to exactly one live transport for its whole lifetime.
#[derive(Debug)]
pub struct StreamSink {
    session_id: String,
    tx: Option<mpsc::UnboundedSender<DeliveryEvent>>,
    state: SinkState,
}

/// Reading half of a [`StreamSink`] transport.
#[derive(Debug)]
pub struct FrameReceiver {
    rx: mpsc::UnboundedReceiver<DeliveryEvent>,
}

impl StreamSink {
    /// Open a transport for `session_id` and bind a sink to it.
    pub fn channel(session_id: impl Into<String>) -> (Self, FrameReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Self {
            session_id: session_id.into(),
            tx: Some(tx),
            state: SinkState::Idle,
        };
        (sink, FrameReceiver { rx })
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    /// True once the transport was released or the peer stopped reading.
    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().map_or(true, |tx| tx.is_closed())
    }

    fn write(&mut self, event: DeliveryEvent) -> Result<(), DeliveryError> {
        let mut next = self.state;
        next.advance(&event)?;
        let terminal = event.is_terminal();

        let Some(tx) = self.tx.as_ref() else {
            self.state = SinkState::Closed;
            return Err(DeliveryError::TransportClosed);
        };
        debug!(session = %self.session_id, event = event.name(), "writing frame");
        if tx.send(event).is_err() {
            warn!(session = %self.session_id, "SSE peer disconnected, frame dropped");
            // Nothing more can reach the peer.
            self.state = SinkState::Closed;
            self.tx = None;
            return Err(DeliveryError::TransportClosed);
        }

        self.state = next;
        if terminal {
            // Release the transport: the response body ends once drained.
            self.tx = None;
        }
        Ok(())
    }
}

impl DeliverySink for StreamSink {
    fn is_streaming(&self) -> bool {
        true
    }

    fn on_start(&mut self, session_id: &str, streaming: bool) -> Result<(), DeliveryError> {
        self.write(DeliveryEvent::Start {
            session_id: session_id.to_string(),
            streaming,
        })
    }

    fn on_chunk(&mut self, text: &str, accumulated: &str) -> Result<(), DeliveryError> {
        self.write(DeliveryEvent::Chunk {
            text: text.to_string(),
            accumulated: accumulated.to_string(),
        })
    }

    fn on_finish(&mut self, complete: bool, session_id: &str) -> Result<(), DeliveryError> {
        self.write(DeliveryEvent::Finish {
            complete,
            session_id: session_id.to_string(),
        })
    }

    fn on_error(&mut self, message: &str) -> Result<(), DeliveryError> {
        self.write(DeliveryEvent::Error {
            message: message.to_string(),
        })
    }
}

impl Drop for StreamSink {
    fn drop(&mut self) {
        if self.state == SinkState::Started {
            warn!(session = %self.session_id, "stream sink dropped without a terminal event");
        }
    }
}

impl FrameReceiver {
    /// Next event, or `None` once the sink released the transport.
    pub async fn recv(&mut self) -> Option<DeliveryEvent> {
        self.rx.recv().await
    }

    pub fn into_stream(self) -> impl Stream<Item = DeliveryEvent> {
        UnboundedReceiverStream::new(self.rx)
    }

    /// Serve the transport as an SSE response body.
    pub fn into_sse(self) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        let events = self.into_stream().map(|event| Ok(to_sse_event(&event)));
        Sse::new(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode;
    use axum::response::IntoResponse;

    async fn drain(mut frames: FrameReceiver) -> Vec<DeliveryEvent> {
        let mut out = Vec::new();
        while let Some(event) = frames.recv().await {
            out.push(event);
        }
        out
    }

    #[tokio::test]
    async fn writes_four_frames_in_call_order() {
        let (mut sink, frames) = StreamSink::channel("abc");
        sink.on_start("abc", true).unwrap();
        sink.on_chunk("He", "He").unwrap();
        sink.on_chunk("llo", "Hello").unwrap();
        sink.on_finish(true, "abc").unwrap();

        let encoded: Vec<String> = drain(frames).await.iter().map(encode).collect();
        assert_eq!(
            encoded,
            vec![
                "event: start\ndata: {\"sessionId\":\"abc\",\"streaming\":true}\n\n",
                "event: chunk\ndata: {\"text\":\"He\",\"accumulated\":\"He\"}\n\n",
                "event: chunk\ndata: {\"text\":\"llo\",\"accumulated\":\"Hello\"}\n\n",
                "event: finish\ndata: {\"complete\":true,\"sessionId\":\"abc\"}\n\n",
            ]
        );
    }

    #[tokio::test]
    async fn terminal_event_releases_transport() {
        let (mut sink, mut frames) = StreamSink::channel("s");
        sink.on_start("s", true).unwrap();
        assert!(!sink.is_closed());
        sink.on_error("upstream failed").unwrap();
        assert!(sink.is_closed());
        assert_eq!(sink.state(), SinkState::Closed);

        assert_eq!(frames.recv().await.map(|e| e.name()), Some("start"));
        assert_eq!(
            frames.recv().await,
            Some(DeliveryEvent::Error { message: "upstream failed".into() })
        );
        // Channel closed even though the sink itself is still alive.
        assert_eq!(frames.recv().await, None);
        drop(sink);
    }

    #[tokio::test]
    async fn calls_after_terminal_are_contract_violations() {
        let (mut sink, frames) = StreamSink::channel("s");
        sink.on_start("s", true).unwrap();
        sink.on_finish(true, "s").unwrap();

        let err = sink.on_chunk("late", "late").unwrap_err();
        assert!(matches!(err, DeliveryError::OutOfOrder { event: "chunk", state: SinkState::Closed }));
        assert!(sink.on_error("late").is_err());
        assert!(sink.on_finish(true, "s").is_err());

        let names: Vec<_> = drain(frames).await.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["start", "finish"]);
    }

    #[tokio::test]
    async fn chunk_before_start_writes_nothing() {
        let (mut sink, frames) = StreamSink::channel("s");
        assert!(sink.on_chunk("x", "x").is_err());
        drop(sink);
        assert!(drain(frames).await.is_empty());
    }

    #[tokio::test]
    async fn disconnected_peer_surfaces_transport_closed() {
        let (mut sink, frames) = StreamSink::channel("s");
        drop(frames);
        assert!(sink.is_closed());
        assert!(matches!(sink.on_start("s", true), Err(DeliveryError::TransportClosed)));
        // A failed write closes the sink, so dropping it is not an abandoned stream.
        assert_eq!(sink.state(), SinkState::Closed);
        assert!(matches!(
            sink.on_chunk("a", "a"),
            Err(DeliveryError::OutOfOrder { event: "chunk", state: SinkState::Closed })
        ));
    }

    #[tokio::test]
    async fn peer_leaving_mid_stream_closes_the_sink() {
        let (mut sink, frames) = StreamSink::channel("s");
        sink.on_start("s", true).unwrap();
        drop(frames);
        assert!(matches!(sink.on_chunk("a", "a"), Err(DeliveryError::TransportClosed)));
        assert_eq!(sink.state(), SinkState::Closed);
    }

    #[tokio::test]
    async fn sse_body_matches_encoded_frames() {
        let (mut sink, frames) = StreamSink::channel("abc");
        sink.on_start("abc", true).unwrap();
        sink.on_chunk("Hi", "Hi").unwrap();
        sink.on_finish(true, "abc").unwrap();

        let response = frames.into_sse().into_response();
        let content_type = response.headers()[axum::http::header::CONTENT_TYPE].clone();
        assert_eq!(content_type, "text/event-stream");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let expected = [
            encode(&DeliveryEvent::Start { session_id: "abc".into(), streaming: true }),
            encode(&DeliveryEvent::Chunk { text: "Hi".into(), accumulated: "Hi".into() }),
            encode(&DeliveryEvent::Finish { complete: true, session_id: "abc".into() }),
        ]
        .concat();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), expected);
    }
}
