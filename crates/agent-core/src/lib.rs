pub mod agent;
pub mod tools;

pub use agent::definition::AgentDefinition;
pub use agent::types::{Conversation, Message, Role};
pub use agent::AgentError;
pub use tools::{
    FunctionSchema, RegistryError, SharedTool, Tool, ToolCall, ToolError, ToolInvocation,
    ToolRegistry, ToolResult, ToolSchema,
};
