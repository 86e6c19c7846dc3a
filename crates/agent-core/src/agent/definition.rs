use std::sync::Arc;

use crate::tools::{RegistryError, SharedTool, Tool, ToolRegistry, ToolSchema};

/// Immutable configuration for one agent role: system prompt, the deployment
/// (model) the completion service should use, and the named tools the model
/// may call. Tool names are validated at construction time, so an unknown
/// tool at runtime is a structural failure rather than a deep branch.
#[derive(Clone)]
pub struct AgentDefinition {
    name: String,
    system_prompt: String,
    deployment: String,
    tools: Arc<ToolRegistry>,
}

impl AgentDefinition {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            deployment: deployment.into(),
            tools: Arc::new(ToolRegistry::new()),
        }
    }

    pub fn with_tool<T>(self, tool: T) -> Result<Self, RegistryError>
    where
        T: Tool + 'static,
    {
        self.with_shared_tool(Arc::new(tool))
    }

    pub fn with_shared_tool(self, tool: SharedTool) -> Result<Self, RegistryError> {
        self.tools.register_shared(tool)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    pub fn tool(&self, name: &str) -> Option<SharedTool> {
        self.tools.get(name)
    }

    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools.list_tools()
    }
}
