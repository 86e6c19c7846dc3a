use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A model-issued request to invoke a named tool with structured arguments.
/// Produced by the completion service inside an assistant message; consumed
/// exactly once by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Answer to one ToolCall. The call id must match the originating call so the
/// completion service can correlate them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub function: FunctionSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Identity of one dispatched tool call. Delegate tools derive child instance
/// ids from this; both fields come out of journaled steps, so they are stable
/// across replays.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub instance_id: String,
    pub call_id: String,
}

impl ToolInvocation {
    /// Deterministic identifier for a sub-orchestration started by this call.
    pub fn child_instance_id(&self) -> String {
        format!("{}/{}", self.instance_id, self.call_id)
    }
}

#[derive(Error, Debug, Clone)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("execution failed: {0}")]
    Execution(String),

    /// The handler cannot produce a result the model should reason about
    /// (e.g. a delegated sub-orchestration failed fatally). Aborts the
    /// enclosing instance instead of being fed back as a tool result.
    #[error("{0}")]
    Fatal(String),
}
