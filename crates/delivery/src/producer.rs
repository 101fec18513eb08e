//! The producer loop shared by every delivery mode.

use std::fmt::Display;

use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::sink::{DeliveryError, DeliverySink};

/// How a relayed session ended from the producer's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The delta stream ran to completion; `finish` was delivered.
    Completed { text: String },
    /// The delta stream failed; `error` was delivered.
    Failed { message: String, partial: String },
}

/// Drive `sink` with a stream of text deltas.
///
/// Emits `start`, one `chunk` per non-empty delta carrying the running
/// concatenation, then `finish` when the stream ends or `error` on the first
/// failed item. Any sink error (dead transport, protocol misuse) stops
/// production immediately and is returned.
pub async fn relay<K, S, E>(
    sink: &mut K,
    session_id: &str,
    deltas: S,
) -> Result<RelayOutcome, DeliveryError>
where
    K: DeliverySink + ?Sized,
    S: Stream<Item = Result<String, E>>,
    E: Display,
{
    let streaming = sink.is_streaming();
    sink.on_start(session_id, streaming)?;

    let mut deltas = std::pin::pin!(deltas);
    let mut accumulated = String::new();
    let mut chunks = 0usize;

    while let Some(item) = deltas.next().await {
        match item {
            Ok(text) if text.is_empty() => continue,
            Ok(text) => {
                accumulated.push_str(&text);
                sink.on_chunk(&text, &accumulated)?;
                chunks += 1;
            }
            Err(e) => {
                let message = e.to_string();
                warn!(session = %session_id, error = %message, chunks, "producer failed mid-stream");
                sink.on_error(&message)?;
                return Ok(RelayOutcome::Failed {
                    message,
                    partial: accumulated,
                });
            }
        }
    }

    sink.on_finish(true, session_id)?;
    debug!(session = %session_id, chunks, chars = accumulated.len(), streaming, "relay finished");
    Ok(RelayOutcome::Completed { text: accumulated })
}
