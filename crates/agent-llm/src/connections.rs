use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read connections file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse connections file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no agent connection named '{0}'")]
    UnknownConnection(String),
}

/// Resolved completion-service connection: endpoint base URL plus API key.
#[derive(Debug, Clone)]
pub struct AgentConnection {
    pub endpoint: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
struct ConnectionsFile {
    #[serde(rename = "agentConnections", default)]
    agent_connections: HashMap<String, ConnectionEntry>,
}

#[derive(Debug, Deserialize)]
struct ConnectionEntry {
    endpoint: String,
    authentication: Authentication,
}

#[derive(Debug, Deserialize)]
struct Authentication {
    key: String,
}

/// Load one named agent connection from a JSON connections file shaped as
/// `{ "agentConnections": { "<name>": { "endpoint", "authentication": { "key" } } } }`.
pub fn load_agent_connection(
    path: impl AsRef<Path>,
    name: &str,
) -> Result<AgentConnection, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let file: ConnectionsFile = serde_json::from_str(&raw)?;

    let entry = file
        .agent_connections
        .get(name)
        .ok_or_else(|| ConfigError::UnknownConnection(name.to_string()))?;

    Ok(AgentConnection {
        endpoint: entry.endpoint.clone(),
        api_key: entry.authentication.key.clone(),
    })
}
