//! In-memory delivery for callers that want the whole text at once.

use crate::event::DeliveryEvent;
use crate::sink::{DeliveryError, DeliverySink, SinkState};

/// Keeps the producer's latest running text.
///
/// Nothing is written anywhere, but the lifecycle is still checked: calls out
/// of order (a chunk after `finish`, say) are rejected and leave the collected
/// text untouched.
#[derive(Debug, Clone)]
pub struct CollectSink {
    accumulated: String,
    state: SinkState,
}

impl Default for CollectSink {
    fn default() -> Self {
        Self {
            accumulated: String::new(),
            state: SinkState::Idle,
        }
    }
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last `accumulated` value delivered, or `""` before any chunk.
    pub fn full_text(&self) -> &str {
        &self.accumulated
    }

    pub fn into_text(self) -> String {
        self.accumulated
    }

    pub fn state(&self) -> SinkState {
        self.state
    }
}

impl DeliverySink for CollectSink {
    fn is_streaming(&self) -> bool {
        false
    }

    fn on_start(&mut self, session_id: &str, streaming: bool) -> Result<(), DeliveryError> {
        self.state.advance(&DeliveryEvent::Start {
            session_id: session_id.to_string(),
            streaming,
        })
    }

    fn on_chunk(&mut self, text: &str, accumulated: &str) -> Result<(), DeliveryError> {
        self.state.advance(&DeliveryEvent::Chunk {
            text: text.to_string(),
            accumulated: accumulated.to_string(),
        })?;
        self.accumulated.clear();
        self.accumulated.push_str(accumulated);
        Ok(())
    }

    fn on_finish(&mut self, complete: bool, session_id: &str) -> Result<(), DeliveryError> {
        self.state.advance(&DeliveryEvent::Finish {
            complete,
            session_id: session_id.to_string(),
        })
    }

    fn on_error(&mut self, message: &str) -> Result<(), DeliveryError> {
        self.state.advance(&DeliveryEvent::Error {
            message: message.to_string(),
        })
    }
}
