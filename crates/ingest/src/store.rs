//! [`MessageStore`] implementations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use async_trait::async_trait;
use mailpipe_core::Message;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::debug;

use crate::source::MessageStore;

// ── In-memory ───────────────────────────────────────────────────────

/// Owner id → every message persisted for that owner, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    messages: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages_for(&self, owner_id: &str) -> Vec<Message> {
        let map = self.messages.read().await;
        map.get(owner_id).cloned().unwrap_or_default()
    }

    pub async fn total(&self) -> usize {
        let map = self.messages.read().await;
        map.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn persist(&self, owner_id: &str, messages: &[Message]) -> anyhow::Result<()> {
        let mut map = self.messages.write().await;
        map.entry(owner_id.to_string())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }
}

// ── JSONL on disk ───────────────────────────────────────────────────

/// Appends each owner's messages to `{data_dir}/messages/{owner}.jsonl`, with
/// the owner id percent-encoded.
///
/// The batch is serialized in full before the file is touched, then written with
/// a single append, so a serialization failure leaves the file unchanged.
#[derive(Debug, Clone)]
pub struct JsonlMessageStore {
    dir: PathBuf,
}

impl JsonlMessageStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("messages"),
        }
    }

    pub fn owner_path(&self, owner_id: &str) -> anyhow::Result<PathBuf> {
        if owner_id.trim().is_empty() {
            bail!("owner id is empty");
        }
        Ok(self.dir.join(format!("{}.jsonl", owner_file_stem(owner_id))))
    }
}

/// Percent-encode an owner id into a file stem.
///
/// Only `[A-Za-z0-9._~-]` pass through, so the stem never contains a path
/// separator, and distinct ids always map to distinct stems.
fn owner_file_stem(owner_id: &str) -> String {
    urlencoding::encode(owner_id).into_owned()
}

#[async_trait]
impl MessageStore for JsonlMessageStore {
    async fn persist(&self, owner_id: &str, messages: &[Message]) -> anyhow::Result<()> {
        let path = self.owner_path(owner_id)?;

        let mut buf = String::new();
        for msg in messages {
            let line = serde_json::to_string(msg)
                .with_context(|| format!("failed to serialize message {}", msg.id))?;
            buf.push_str(&line);
            buf.push('\n');
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        debug!(owner_id, count = messages.len(), path = %path.display(), "batch appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: &[&str]) -> Vec<Message> {
        ids.iter().map(|id| Message::with_id(*id)).collect()
    }

    #[tokio::test]
    async fn memory_store_groups_by_owner() {
        let store = MemoryMessageStore::new();
        store.persist("alice", &batch(&["1", "2"])).await.unwrap();
        store.persist("bob", &batch(&["3"])).await.unwrap();
        store.persist("alice", &batch(&["4"])).await.unwrap();

        let alice: Vec<_> = store.messages_for("alice").await.into_iter().map(|m| m.id).collect();
        assert_eq!(alice, vec!["1", "2", "4"]);
        assert_eq!(store.total().await, 4);
        assert!(store.messages_for("carol").await.is_empty());
    }

    #[tokio::test]
    async fn jsonl_store_appends_batches() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlMessageStore::new(dir.path());
        store.persist("alice", &batch(&["1", "2"])).await.unwrap();
        store.persist("alice", &batch(&["3"])).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("messages/alice.jsonl")).unwrap();
        let ids: Vec<String> = raw
            .lines()
            .map(|l| serde_json::from_str::<Message>(l).unwrap().id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn owner_ids_become_safe_file_names() {
        let store = JsonlMessageStore::new(Path::new("/data"));
        assert_eq!(
            store.owner_path("user@example.com").unwrap(),
            PathBuf::from("/data/messages/user%40example.com.jsonl")
        );
        assert_eq!(
            store.owner_path("../../etc/passwd").unwrap(),
            PathBuf::from("/data/messages/..%2F..%2Fetc%2Fpasswd.jsonl")
        );
        assert!(store.owner_path("   ").is_err());
    }

    #[test]
    fn distinct_owners_never_share_a_file() {
        let store = JsonlMessageStore::new(Path::new("/data"));
        let ids = ["user@example.com", "user_example.com", "user%40example.com", " alice", "alice"];
        let paths: std::collections::HashSet<_> =
            ids.iter().map(|id| store.owner_path(id).unwrap()).collect();
        assert_eq!(paths.len(), ids.len());
    }

    #[tokio::test]
    async fn similar_owner_ids_keep_their_mail_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlMessageStore::new(dir.path());
        store.persist("user@example.com", &batch(&["alice-secret"])).await.unwrap();
        store.persist("user_example.com", &batch(&["other-msg"])).await.unwrap();

        let raw = std::fs::read_to_string(store.owner_path("user_example.com").unwrap()).unwrap();
        assert!(raw.contains("other-msg"));
        assert!(!raw.contains("alice-secret"));
    }
}
