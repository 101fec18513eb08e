use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use mailpipe_ingest::IngestionOutcome;
use mailpipe_server::{build_router, AppState};

// ── CLI ─────────────────────────────────────────────────────────────

/// mailpipe server: streamed chat delivery and background mail ingestion.
#[derive(Parser, Debug)]
#[command(name = "mailpipe-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default).
    Serve,
    /// Run one ingestion job in the foreground and print its outcome.
    Ingest {
        /// Access token handed to the mail source.
        #[arg(long, env = "MAILPIPE_ACCESS_TOKEN")]
        token: String,
        /// Owner the batch is persisted under.
        #[arg(long)]
        owner: String,
    },
}

fn load_config() -> mailpipe_core::Config {
    mailpipe_core::config::load_dotenv();
    mailpipe_core::Config::from_env()
}

async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let port = state.config.server.port;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://localhost:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn ingest_once(state: &AppState, token: &str, owner: &str) -> anyhow::Result<()> {
    match state.ingestion.run(token, owner).await {
        IngestionOutcome::SkippedEmpty => println!("nothing to ingest"),
        IngestionOutcome::Persisted(n) => println!("persisted {n} messages for {owner}"),
        IngestionOutcome::Failed(reason) => anyhow::bail!("ingestion failed: {reason}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config();
    config.log_summary();

    let state = Arc::new(AppState::from_config(config)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state).await?,
        Command::Ingest { token, owner } => ingest_once(&state, &token, &owner).await?,
    }

    Ok(())
}
