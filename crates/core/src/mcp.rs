//! Registry of named MCP server endpoints.
//!
//! The registry is an ordered list built once at start-up (from YAML) and shared
//! by `Arc` with whatever needs endpoint discovery. Nothing looks endpoints up
//! through global state.
//!
//! ```yaml
//! servers:
//!   - name: gmail
//!     transport: stdio
//!     command: gmail-mcp
//!     args: ["--readonly"]
//!   - name: calendar
//!     transport: http
//!     url: http://localhost:8931/mcp
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CoreError;

/// How a client reaches an MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum McpTransport {
    /// Spawned subprocess speaking JSON-RPC over stdin/stdout.
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Remote server over streamable HTTP.
    Http { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerEntry {
    pub name: String,
    #[serde(flatten)]
    pub transport: McpTransport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    servers: Vec<McpServerEntry>,
}

/// Ordered, immutable list of MCP endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct McpRegistry {
    servers: Vec<McpServerEntry>,
}

impl McpRegistry {
    /// Build a registry, rejecting empty or duplicate names.
    pub fn new(servers: Vec<McpServerEntry>) -> Result<Self, CoreError> {
        let mut seen = HashSet::with_capacity(servers.len());
        for entry in &servers {
            if entry.name.trim().is_empty() {
                return Err(CoreError::Config("MCP server name must not be empty".into()));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(CoreError::Config(format!(
                    "duplicate MCP server name: {}",
                    entry.name
                )));
            }
        }
        Ok(Self { servers })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CoreError> {
        let file: RegistryFile = serde_yaml::from_str(yaml)?;
        Self::new(file.servers)
    }

    /// Load from a YAML file. A missing file yields an empty registry.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            warn!(path = %path.display(), "MCP servers file not found, starting with empty registry");
            return Ok(Self::default());
        }
        let yaml = std::fs::read_to_string(path)?;
        let registry = Self::from_yaml_str(&yaml)?;
        info!(path = %path.display(), count = registry.len(), names = ?registry.names(), "MCP registry loaded");
        Ok(registry)
    }

    pub fn servers(&self) -> &[McpServerEntry] {
        &self.servers
    }

    pub fn get(&self, name: &str) -> Option<&McpServerEntry> {
        self.servers.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.servers.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
