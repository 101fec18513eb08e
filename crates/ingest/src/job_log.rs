//! Append-only JSONL record of finished ingestion runs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

use crate::job::IngestionOutcome;

/// One line of `ingestion/jobs.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLogEntry {
    pub id: Uuid,
    pub owner_id: String,
    /// `skipped_empty`, `persisted` or `failed`.
    pub outcome: String,
    pub persisted: usize,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl JobLogEntry {
    pub fn new(
        id: Uuid,
        owner_id: &str,
        outcome: &IngestionOutcome,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        let (persisted, error) = match outcome {
            IngestionOutcome::Persisted(n) => (*n, None),
            IngestionOutcome::Failed(reason) => (0, Some(reason.clone())),
            IngestionOutcome::SkippedEmpty => (0, None),
        };
        Self {
            id,
            owner_id: owner_id.to_string(),
            outcome: outcome.label().to_string(),
            persisted,
            error,
            started_at,
            completed_at: Utc::now(),
            duration_ms,
        }
    }
}

/// Handle on `{data_dir}/ingestion/jobs.jsonl`.
#[derive(Debug, Clone)]
pub struct JobLog {
    path: PathBuf,
}

impl JobLog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("ingestion").join("jobs.jsonl"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. Failures are logged and swallowed.
    pub async fn append(&self, entry: &JobLogEntry) {
        if let Err(e) = self.try_append(entry).await {
            warn!(error = %format!("{e:#}"), path = %self.path.display(), "failed to write job log entry");
        }
    }

    async fn try_append(&self, entry: &JobLogEntry) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .context("failed to create ingestion log directory")?;
        }

        let mut line = serde_json::to_string(entry).context("failed to serialize job log entry")?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .context("failed to open job log")?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read every entry; a missing log reads as empty.
    pub async fn read_all(&self) -> anyhow::Result<Vec<JobLogEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("failed to read job log"),
        };
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .enumerate()
            .map(|(i, l)| {
                serde_json::from_str(l).with_context(|| format!("malformed job log line {}", i + 1))
            })
            .collect()
    }
}
