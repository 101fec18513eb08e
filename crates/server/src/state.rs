use std::sync::Arc;
use std::time::Duration;

use mailpipe_core::config::StoreKind;
use mailpipe_core::{Config, McpRegistry};
use mailpipe_ingest::{
    IngestionJob, JobLog, JsonlMailSourceFactory, JsonlMessageStore, MemoryMessageStore,
    MessageStore,
};
use tracing::info;

use crate::generator::{EchoGenerator, TextGenerator};

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub config: Config,
    /// Named MCP endpoints, loaded once at start-up.
    pub mcp: Arc<McpRegistry>,
    pub generator: Arc<dyn TextGenerator>,
    pub ingestion: Arc<IngestionJob>,
}

impl AppState {
    /// Wire collaborators from config.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let mcp = Arc::new(McpRegistry::load(&config.mcp.servers_file)?);

        let store: Arc<dyn MessageStore> = match config.ingest.store {
            StoreKind::Jsonl => Arc::new(JsonlMessageStore::new(&config.storage.data_dir)),
            StoreKind::Memory => Arc::new(MemoryMessageStore::new()),
        };
        let sources = Arc::new(JsonlMailSourceFactory::new(config.ingest.mailbox_path.clone()));
        let ingestion = IngestionJob::new(sources, store)
            .with_job_log(JobLog::new(&config.storage.data_dir));

        let generator = Arc::new(EchoGenerator::new(Duration::from_millis(
            config.chat.chunk_delay_ms,
        )));
        info!(generator = generator.name(), mcp_servers = mcp.len(), "application state ready");

        Ok(Self {
            config,
            mcp,
            generator,
            ingestion: Arc::new(ingestion),
        })
    }
}
