//! Fire-and-forget ingestion job.
//!
//! [`spawn_ingestion_job`] is the entry point for request handlers: it assigns a
//! job id, spawns [`IngestionJob::run`] in a background tokio task and returns the
//! id without waiting. Every failure is caught at the job boundary, logged with
//! its error chain and recorded as [`IngestionOutcome::Failed`]; nothing is
//! propagated to the caller.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::job_log::{JobLog, JobLogEntry};
use crate::source::{MailSourceFactory, MessageStore};

// ── Outcome & errors ────────────────────────────────────────────────

/// How a job run ended. Diagnostic only; callers of [`spawn_ingestion_job`]
/// never see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionOutcome {
    /// The source had nothing to fetch; persistence was not called.
    SkippedEmpty,
    /// The whole batch of `n` messages was persisted.
    Persisted(usize),
    /// Some step failed; carries the error chain.
    Failed(String),
}

impl IngestionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            IngestionOutcome::SkippedEmpty => "skipped_empty",
            IngestionOutcome::Persisted(_) => "persisted",
            IngestionOutcome::Failed(_) => "failed",
        }
    }
}

/// Step of the pipeline a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Initialize,
    Fetch,
    Persist,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IngestStage::Initialize => "initialize",
            IngestStage::Fetch => "fetch",
            IngestStage::Persist => "persist",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to initialize mail source: {0:#}")]
    Initialize(anyhow::Error),

    #[error("failed to fetch messages: {0:#}")]
    Fetch(anyhow::Error),

    #[error("failed to persist batch of {count} messages: {cause:#}")]
    Persist { count: usize, cause: anyhow::Error },
}

impl IngestError {
    pub fn stage(&self) -> IngestStage {
        match self {
            IngestError::Initialize(_) => IngestStage::Initialize,
            IngestError::Fetch(_) => IngestStage::Fetch,
            IngestError::Persist { .. } => IngestStage::Persist,
        }
    }

    /// Underlying collaborator error (with backtrace when one was captured).
    pub fn cause(&self) -> &anyhow::Error {
        match self {
            IngestError::Initialize(e) | IngestError::Fetch(e) => e,
            IngestError::Persist { cause, .. } => cause,
        }
    }
}

// ── Job ─────────────────────────────────────────────────────────────

/// Stateless fetch-then-persist pipeline. Each run builds its own source client;
/// nothing carries over between runs.
pub struct IngestionJob {
    sources: Arc<dyn MailSourceFactory>,
    store: Arc<dyn MessageStore>,
    job_log: Option<JobLog>,
}

impl IngestionJob {
    pub fn new(sources: Arc<dyn MailSourceFactory>, store: Arc<dyn MessageStore>) -> Self {
        Self {
            sources,
            store,
            job_log: None,
        }
    }

    /// Also append every run's outcome to a JSONL job log.
    pub fn with_job_log(mut self, job_log: JobLog) -> Self {
        self.job_log = Some(job_log);
        self
    }

    /// Run once and wait for the outcome (CLI and tests; handlers use
    /// [`spawn_ingestion_job`]).
    pub async fn run(&self, access_token: &str, owner_id: &str) -> IngestionOutcome {
        self.run_as(Uuid::new_v4(), access_token, owner_id).await
    }

    async fn run_as(&self, job_id: Uuid, access_token: &str, owner_id: &str) -> IngestionOutcome {
        let started_at = Utc::now();
        let start = Instant::now();
        info!(job_id = %job_id, owner_id = %owner_id, "ingestion job started");

        let outcome = match self.execute(job_id, access_token, owner_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = e.to_string();
                error!(
                    job_id = %job_id,
                    owner_id = %owner_id,
                    stage = %e.stage(),
                    error = %reason,
                    trace = ?e.cause(),
                    "ingestion job failed"
                );
                IngestionOutcome::Failed(reason)
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            IngestionOutcome::SkippedEmpty => {
                info!(job_id = %job_id, owner_id = %owner_id, duration_ms, "no messages fetched, nothing to persist");
            }
            IngestionOutcome::Persisted(n) => {
                info!(job_id = %job_id, owner_id = %owner_id, persisted = n, duration_ms, "ingestion job completed");
            }
            IngestionOutcome::Failed(_) => {}
        }

        if let Some(ref log) = self.job_log {
            log.append(&JobLogEntry::new(job_id, owner_id, &outcome, started_at, duration_ms))
                .await;
        }

        outcome
    }

    async fn execute(
        &self,
        job_id: Uuid,
        access_token: &str,
        owner_id: &str,
    ) -> Result<IngestionOutcome, IngestError> {
        let mut source = self.sources.create();
        source
            .initialize(access_token)
            .await
            .map_err(IngestError::Initialize)?;
        info!(job_id = %job_id, "mail source initialized");

        let batch = source.list_messages().await.map_err(IngestError::Fetch)?;
        info!(job_id = %job_id, fetched = batch.len(), "fetched message batch");

        if batch.is_empty() {
            return Ok(IngestionOutcome::SkippedEmpty);
        }

        self.store
            .persist(owner_id, &batch)
            .await
            .map_err(|cause| IngestError::Persist {
                count: batch.len(),
                cause,
            })?;

        Ok(IngestionOutcome::Persisted(batch.len()))
    }
}

/// Spawn an ingestion run as a fire-and-forget background task.
///
/// Returns the job id immediately; the id only correlates log lines.
pub fn spawn_ingestion_job(job: Arc<IngestionJob>, access_token: String, owner_id: String) -> Uuid {
    let job_id = Uuid::new_v4();
    tokio::spawn(async move {
        job.run_as(job_id, &access_token, &owner_id).await;
    });
    job_id
}

// ── Tests ───────────────────────────────────────────────────────────
