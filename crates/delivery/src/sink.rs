//! The sink capability shared by every delivery backend.

use std::fmt;

use crate::event::DeliveryEvent;

/// Errors a sink reports back to its producer.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The reading side of the transport is gone (peer disconnected).
    #[error("Transport closed: the peer is no longer reading")]
    TransportClosed,

    /// A lifecycle call arrived in an order the protocol forbids.
    #[error("Out-of-order `{event}` event: sink is {state}")]
    OutOfOrder { event: &'static str, state: SinkState },
}

/// Where a sink is in its `start → chunk* → terminal` lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Created, nothing written yet.
    Idle,
    /// `start` written; chunks and a terminal event may follow.
    Started,
    /// Terminal event written; nothing may follow.
    Closed,
}

impl fmt::Display for SinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SinkState::Idle => "idle",
            SinkState::Started => "started",
            SinkState::Closed => "closed",
        };
        f.write_str(s)
    }
}

impl SinkState {
    /// Move to the state that follows `event`, or reject it.
    pub fn advance(&mut self, event: &DeliveryEvent) -> Result<(), DeliveryError> {
        let next = match (*self, event) {
            (SinkState::Idle, DeliveryEvent::Start { .. }) => SinkState::Started,
            (SinkState::Started, DeliveryEvent::Chunk { .. }) => SinkState::Started,
            (SinkState::Started, DeliveryEvent::Finish { .. } | DeliveryEvent::Error { .. }) => {
                SinkState::Closed
            }
            (state, event) => {
                return Err(DeliveryError::OutOfOrder {
                    event: event.name(),
                    state,
                })
            }
        };
        *self = next;
        Ok(())
    }
}

/// Receiver of a producer's lifecycle callbacks.
///
/// One producer drives one sink; calls are made in sequence, never concurrently.
pub trait DeliverySink: Send {
    /// Whether output reaches the caller live (`true`) or only once complete.
    fn is_streaming(&self) -> bool;

    /// Beginning of delivery. At most once, before any chunk.
    fn on_start(&mut self, session_id: &str, streaming: bool) -> Result<(), DeliveryError>;

    /// One incremental unit. `accumulated` is the producer's running text and
    /// is taken as-is.
    fn on_chunk(&mut self, text: &str, accumulated: &str) -> Result<(), DeliveryError>;

    /// Terminal success.
    fn on_finish(&mut self, complete: bool, session_id: &str) -> Result<(), DeliveryError>;

    /// Terminal failure, mutually exclusive with `on_finish`.
    fn on_error(&mut self, message: &str) -> Result<(), DeliveryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DeliveryEvent {
        DeliveryEvent::Start { session_id: "s".into(), streaming: true }
    }

    fn chunk() -> DeliveryEvent {
        DeliveryEvent::Chunk { text: "a".into(), accumulated: "a".into() }
    }

    fn finish() -> DeliveryEvent {
        DeliveryEvent::Finish { complete: true, session_id: "s".into() }
    }

    #[test]
    fn happy_path_reaches_closed() {
        let mut state = SinkState::Idle;
        state.advance(&start()).unwrap();
        state.advance(&chunk()).unwrap();
        state.advance(&chunk()).unwrap();
        state.advance(&finish()).unwrap();
        assert_eq!(state, SinkState::Closed);
    }

    #[test]
    fn chunk_before_start_is_rejected() {
        let mut state = SinkState::Idle;
        let err = state.advance(&chunk()).unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::OutOfOrder { event: "chunk", state: SinkState::Idle }
        ));
        assert_eq!(state, SinkState::Idle);
    }

    #[test]
    fn second_start_is_rejected() {
        let mut state = SinkState::Idle;
        state.advance(&start()).unwrap();
        assert!(state.advance(&start()).is_err());
    }

    #[test]
    fn nothing_follows_a_terminal_event() {
        let mut state = SinkState::Idle;
        state.advance(&start()).unwrap();
        state.advance(&DeliveryEvent::Error { message: "x".into() }).unwrap();
        for event in [start(), chunk(), finish()] {
            assert!(state.advance(&event).is_err());
        }
        assert_eq!(state, SinkState::Closed);
    }

    #[test]
    fn error_message_names_event_and_state() {
        let err = DeliveryError::OutOfOrder { event: "chunk", state: SinkState::Closed };
        assert_eq!(err.to_string(), "Out-of-order `chunk` event: sink is closed");
    }
}
