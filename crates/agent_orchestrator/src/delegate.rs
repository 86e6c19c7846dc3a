use agent_core::{AgentDefinition, Tool, ToolError, ToolInvocation};
use agent_loop::{run_instance, RunnerContext};
use async_trait::async_trait;

type InputBuilder = dyn Fn(&serde_json::Value) -> Result<String, ToolError> + Send + Sync;
type AnswerHook = dyn Fn(&str) + Send + Sync;

/// Tool handler that runs a whole child orchestration instance.
///
/// The child's initial user message is derived from the tool-call arguments
/// by `input_builder` (explicit data passing, no shared state), the child id
/// derives from the parent instance and call id, and the parent blocks until
/// the child terminates. From the parent loop's perspective this is one
/// journal step: on parent replay the child is not re-run, and on a crash
/// inside the child the re-executed step resumes the child's own journal.
pub struct DelegateTool {
    name: String,
    description: String,
    schema: serde_json::Value,
    child: AgentDefinition,
    ctx: RunnerContext,
    input_builder: Box<InputBuilder>,
    answer_hook: Option<Box<AnswerHook>>,
}

impl DelegateTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: serde_json::Value,
        child: AgentDefinition,
        ctx: RunnerContext,
        input_builder: impl Fn(&serde_json::Value) -> Result<String, ToolError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            child,
            ctx,
            input_builder: Box::new(input_builder),
            answer_hook: None,
        }
    }

    /// Observe the child's final answer (e.g. to retain the latest draft for
    /// a later revision request). The hook fires through `observe_result`,
    /// so it also fires when the parent replays this step from its journal
    /// and the child never runs.
    pub fn on_answer(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.answer_hook = Some(Box::new(hook));
        self
    }
}

#[async_trait]
impl Tool for DelegateTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.schema.clone()
    }

    async fn execute(
        &self,
        invocation: &ToolInvocation,
        args: serde_json::Value,
    ) -> Result<String, ToolError> {
        let input = (self.input_builder)(&args)?;
        let child_id = invocation.child_instance_id();

        log::info!(
            "[{}] delegating to agent '{}' as instance '{}'",
            invocation.instance_id,
            self.child.name(),
            child_id
        );

        run_instance(&self.ctx, &self.child, &child_id, &input)
            .await
            .map_err(|error| {
                ToolError::Fatal(format!(
                    "sub-orchestration '{}' failed: {}",
                    child_id, error
                ))
            })
    }

    fn observe_result(&self, _invocation: &ToolInvocation, content: &str) {
        if let Some(hook) = &self.answer_hook {
            hook(content);
        }
    }
}
