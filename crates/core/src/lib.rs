pub mod config;
pub mod error;
pub mod mcp;
pub mod message;

pub use config::Config;
pub use error::*;
pub use mcp::{McpRegistry, McpServerEntry, McpTransport};
pub use message::{IngestionBatch, Message};
