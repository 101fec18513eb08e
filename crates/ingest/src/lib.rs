//! Background mail ingestion.
//!
//! An [`IngestionJob`] runs `initialize source → fetch batch → persist batch`
//! once per invocation. [`spawn_ingestion_job`] detaches it onto the tokio
//! runtime: the caller gets a job id back immediately and never observes the
//! outcome. Failures are contained inside the job and surface only through
//! `tracing` diagnostics and the optional JSONL [`JobLog`].

pub mod file_source;
pub mod job;
pub mod job_log;
pub mod source;
pub mod store;

pub use file_source::{JsonlMailSource, JsonlMailSourceFactory};
pub use job::{spawn_ingestion_job, IngestError, IngestStage, IngestionJob, IngestionOutcome};
pub use job_log::{JobLog, JobLogEntry};
pub use source::{MailSource, MailSourceFactory, MessageStore};
pub use store::{JsonlMessageStore, MemoryMessageStore};
