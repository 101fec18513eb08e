//! HTTP surface of mailpipe.
//!
//! Library target so integration tests can build the router directly; the
//! `mailpipe-server` binary in `main.rs` only parses the CLI and serves it.

pub mod api;
pub mod generator;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
