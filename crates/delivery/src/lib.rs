//! Streaming result delivery for mailpipe.
//!
//! A producer of incremental text is written once against [`DeliverySink`] and
//! stays oblivious to where its output goes:
//!
//! - **[`StreamSink`]** writes every lifecycle event as a Server-Sent Events frame
//!   to a live transport and releases the transport on the terminal event.
//! - **[`CollectSink`]** keeps only the running text for a synchronous reply.
//!
//! [`relay`] is the canonical producer loop that turns a stream of text deltas
//! into `start → chunk* → finish | error`.
//!
//! ```no_run
//! use mailpipe_delivery::{relay, StreamSink};
//!
//! # async fn example() {
//! let (mut sink, frames) = StreamSink::channel("session-1");
//! let deltas = futures::stream::iter(vec![Ok::<_, std::io::Error>("He".to_string()), Ok("llo".to_string())]);
//! tokio::spawn(async move { relay(&mut sink, "session-1", deltas).await });
//! let sse = frames.into_sse();
//! # let _ = sse;
//! # }
//! ```

pub mod collect_sink;
pub mod event;
pub mod frame;
pub mod producer;
pub mod sink;
pub mod stream_sink;

pub use collect_sink::CollectSink;
pub use event::DeliveryEvent;
pub use producer::{relay, RelayOutcome};
pub use sink::{DeliveryError, DeliverySink, SinkState};
pub use stream_sink::{FrameReceiver, StreamSink};
