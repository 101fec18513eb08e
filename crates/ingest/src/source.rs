//! Collaborators the ingestion job consumes.

use async_trait::async_trait;
use mailpipe_core::{IngestionBatch, Message};

/// A mail client scoped to one access token.
///
/// `initialize` must complete before `list_messages`.
#[async_trait]
pub trait MailSource: Send {
    async fn initialize(&mut self, access_token: &str) -> anyhow::Result<()>;

    /// Fetch one batch of available messages.
    async fn list_messages(&mut self) -> anyhow::Result<IngestionBatch>;
}

/// Builds a fresh, uninitialized [`MailSource`] for every job run.
pub trait MailSourceFactory: Send + Sync {
    fn create(&self) -> Box<dyn MailSource>;
}

/// Persistence for fetched batches. A batch is written all-or-nothing.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn persist(&self, owner_id: &str, messages: &[Message]) -> anyhow::Result<()>;
}
