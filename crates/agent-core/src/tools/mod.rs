pub mod registry;
pub mod types;

pub use registry::{RegistryError, SharedTool, Tool, ToolRegistry};
pub use types::{FunctionSchema, ToolCall, ToolError, ToolInvocation, ToolResult, ToolSchema};
