use agent_core::{Message, ToolCall, ToolSchema};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("empty completion response")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, CompletionError>;

/// One assistant turn produced by the completion service: content plus
/// zero-or-more tool calls. Serializable so the journal can record it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionReply {
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl CompletionReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls: calls,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// The external conversational endpoint producing the next turn given the
/// full ordered history and the agent's tool schemas.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        deployment: &str,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<CompletionReply>;
}
