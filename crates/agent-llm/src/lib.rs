pub mod connections;
pub mod openai;
pub mod provider;
pub mod testing;

pub use connections::{load_agent_connection, AgentConnection, ConfigError};
pub use openai::OpenAIClient;
pub use provider::{CompletionClient, CompletionError, CompletionReply, Result};
pub use testing::ScriptedClient;
