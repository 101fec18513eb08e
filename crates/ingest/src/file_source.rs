//! Mail source backed by a JSONL mailbox export (one [`Message`] per line).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use async_trait::async_trait;
use mailpipe_core::{IngestionBatch, Message};
use tracing::debug;

use crate::source::{MailSource, MailSourceFactory};

pub struct JsonlMailSource {
    path: PathBuf,
    loaded: Option<Vec<Message>>,
}

impl JsonlMailSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: None,
        }
    }
}

fn parse_mailbox(content: &str, path: &Path) -> anyhow::Result<Vec<Message>> {
    let mut messages = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let msg: Message = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: malformed message", path.display(), i + 1))?;
        messages.push(msg);
    }
    Ok(messages)
}

#[async_trait]
impl MailSource for JsonlMailSource {
    async fn initialize(&mut self, access_token: &str) -> anyhow::Result<()> {
        if access_token.trim().is_empty() {
            bail!("access token is empty");
        }
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to open mailbox {}", self.path.display()))?;
        let messages = parse_mailbox(&content, &self.path)?;
        debug!(path = %self.path.display(), count = messages.len(), "mailbox loaded");
        self.loaded = Some(messages);
        Ok(())
    }

    async fn list_messages(&mut self) -> anyhow::Result<IngestionBatch> {
        match self.loaded.take() {
            Some(messages) => Ok(messages),
            None => bail!("mail source not initialized"),
        }
    }
}

/// Builds a [`JsonlMailSource`] over the same mailbox for every run.
#[derive(Debug, Clone)]
pub struct JsonlMailSourceFactory {
    path: PathBuf,
}

impl JsonlMailSourceFactory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MailSourceFactory for JsonlMailSourceFactory {
    fn create(&self) -> Box<dyn MailSource> {
        Box::new(JsonlMailSource::new(self.path.clone()))
    }
}
