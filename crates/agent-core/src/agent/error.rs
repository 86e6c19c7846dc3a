use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// The model requested a tool the agent was never configured with. This is
    /// a programming-contract violation; the instance fails and is not fed
    /// back to the model as a tool failure.
    #[error("agent '{agent}' has no tool named '{tool}'")]
    UnknownTool { agent: String, tool: String },

    #[error("completion service error: {0}")]
    Completion(String),

    #[error("journal error: {0}")]
    Journal(String),

    #[error("delegated agent failed: {0}")]
    Delegation(String),
}
