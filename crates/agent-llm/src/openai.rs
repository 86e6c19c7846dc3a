use agent_core::{Message, Role, ToolCall, ToolSchema};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::provider::{CompletionClient, CompletionError, CompletionReply, Result};

/// Non-streaming client for an OpenAI-compatible chat-completions endpoint.
/// The loop engine consumes whole assistant turns, so there is no need for
/// incremental delivery here.
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn build_request_body(
        &self,
        deployment: &str,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> serde_json::Value {
        let wire_messages: Vec<serde_json::Value> =
            messages.iter().map(wire_message).collect();

        let mut body = serde_json::json!({
            "model": deployment,
            "messages": wire_messages,
        });
        if !tools.is_empty() {
            body["tools"] = serde_json::json!(tools);
        }
        body
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

fn wire_message(message: &Message) -> serde_json::Value {
    let mut value = serde_json::json!({
        "role": wire_role(message.role),
        "content": message.content,
    });

    if let Some(tool_calls) = &message.tool_calls {
        let calls: Vec<serde_json::Value> = tool_calls
            .iter()
            .map(|call| {
                serde_json::json!({
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": call.arguments.to_string(),
                    },
                })
            })
            .collect();
        value["tool_calls"] = serde_json::json!(calls);
    }

    if let Some(tool_call_id) = &message.tool_call_id {
        value["tool_call_id"] = serde_json::json!(tool_call_id);
    }

    value
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(
        &self,
        deployment: &str,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<CompletionReply> {
        let body = self.build_request_body(deployment, messages, tools);
        log::debug!(
            "completion request: deployment '{}', {} messages, {} tools",
            deployment,
            messages.len(),
            tools.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(CompletionError::Api(format!("HTTP {}: {}", status, text)));
        }

        let completion: ChatCompletion = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyResponse)?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = serde_json::from_str(&call.function.arguments)
                    .unwrap_or(serde_json::Value::Null);
                ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments,
                }
            })
            .collect();

        Ok(CompletionReply {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunctionCall,
}

#[derive(Debug, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}
