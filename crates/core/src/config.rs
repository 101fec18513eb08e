use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ingest: IngestConfig,
    pub mcp: McpConfig,
    pub chat: ChatConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `MAILPIPE_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("MAILPIPE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        let storage = StorageConfig::from_env_profiled(p);
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            ingest: IngestConfig::from_env_profiled(p, &storage),
            mcp: McpConfig::from_env_profiled(p),
            chat: ChatConfig::from_env_profiled(p),
            storage,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:   {}:{}", self.server.host, self.server.port);
        tracing::info!("  storage:  data_dir={}", self.storage.data_dir.display());
        tracing::info!(
            "  ingest:   mailbox={}, store={}",
            self.ingest.mailbox_path.display(),
            self.ingest.store.as_str()
        );
        tracing::info!("  mcp:      servers_file={}", self.mcp.servers_file.display());
        tracing::info!("  chat:     chunk_delay_ms={}", self.chat.chunk_delay_ms);
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "storage": { "data_dir": self.storage.data_dir },
            "ingest": {
                "mailbox_path": self.ingest.mailbox_path,
                "store": self.ingest.store.as_str(),
            },
            "mcp": { "servers_file": self.mcp.servers_file },
            "chat": { "chunk_delay_ms": self.chat.chunk_delay_ms },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 3001),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            data_dir: PathBuf::from(profiled_env_or(p, "DATA_DIR", "data")),
        }
    }
}

// ── Ingestion ─────────────────────────────────────────────────

/// Where ingested batches are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Jsonl,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Jsonl => "jsonl",
            StoreKind::Memory => "memory",
        }
    }

    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "memory" => StoreKind::Memory,
            _ => StoreKind::Jsonl,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// JSONL mailbox export read by the file-backed mail source.
    pub mailbox_path: PathBuf,
    pub store: StoreKind,
}

impl IngestConfig {
    fn from_env_profiled(p: &str, storage: &StorageConfig) -> Self {
        let mailbox_path = profiled_env_opt(p, "MAILBOX_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| storage.data_dir.join("mailbox.jsonl"));
        Self {
            mailbox_path,
            store: StoreKind::parse(&profiled_env_or(p, "INGEST_STORE", "jsonl")),
        }
    }
}

// ── MCP ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// YAML file listing the named MCP server endpoints.
    pub servers_file: PathBuf,
}

impl McpConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            servers_file: PathBuf::from(profiled_env_or(
                p,
                "MCP_SERVERS_FILE",
                "config/mcp_servers.yaml",
            )),
        }
    }
}

// ── Chat ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Pause between generated deltas; 0 disables pacing.
    pub chunk_delay_ms: u64,
}

impl ChatConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            chunk_delay_ms: profiled_env_u64(p, "CHAT_CHUNK_DELAY_MS", 20),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own profile prefix so parallel tests don't share keys.

    #[test]
    fn profiled_key_wins_over_plain_key() {
        env::set_var("CFGTEST_A_PORT", "4100");
        let config = Config::for_profile("cfgtest_a");
        assert_eq!(config.profile, "CFGTEST_A");
        assert_eq!(config.server.port, 4100);
        env::remove_var("CFGTEST_A_PORT");
    }

    #[test]
    fn mailbox_defaults_under_data_dir() {
        env::set_var("CFGTEST_B_DATA_DIR", "/tmp/mailpipe-b");
        let config = Config::for_profile("cfgtest_b");
        if env_opt("MAILBOX_PATH").is_none() {
            assert_eq!(
                config.ingest.mailbox_path,
                PathBuf::from("/tmp/mailpipe-b/mailbox.jsonl")
            );
        }
        env::remove_var("CFGTEST_B_DATA_DIR");
    }

    #[test]
    fn unparsable_numbers_fall_back_to_default() {
        env::set_var("CFGTEST_C_CHAT_CHUNK_DELAY_MS", "soon");
        let config = Config::for_profile("cfgtest_c");
        if env_opt("CHAT_CHUNK_DELAY_MS").is_none() {
            assert_eq!(config.chat.chunk_delay_ms, 20);
        }
        env::remove_var("CFGTEST_C_CHAT_CHUNK_DELAY_MS");
    }

    #[test]
    fn store_kind_parse() {
        assert_eq!(StoreKind::parse("memory"), StoreKind::Memory);
        assert_eq!(StoreKind::parse("MEMORY"), StoreKind::Memory);
        assert_eq!(StoreKind::parse("jsonl"), StoreKind::Jsonl);
        assert_eq!(StoreKind::parse("anything-else"), StoreKind::Jsonl);
    }

    #[test]
    fn redacted_summary_uses_default_label() {
        let config = Config::for_profile("");
        let summary = config.redacted_summary();
        assert_eq!(summary["profile"], "default");
        assert!(summary["server"]["port"].is_number());
    }
}
