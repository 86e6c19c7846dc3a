use std::sync::Arc;

use agent_core::{
    AgentDefinition, AgentError, Conversation, Message, ToolError, ToolInvocation, ToolResult,
};
use agent_journal::{Journal, JournalStore, StepError};
use agent_llm::{CompletionClient, CompletionError, CompletionReply};

pub type Result<T> = std::result::Result<T, AgentError>;

/// Services every orchestration instance needs: the completion endpoint and
/// the durable step store. Cloned freely; delegate tools carry one so child
/// instances run against the same backing services.
#[derive(Clone)]
pub struct RunnerContext {
    pub completion: Arc<dyn CompletionClient>,
    pub journal_store: Arc<dyn JournalStore>,
}

impl RunnerContext {
    pub fn new(completion: Arc<dyn CompletionClient>, journal_store: Arc<dyn JournalStore>) -> Self {
        Self {
            completion,
            journal_store,
        }
    }
}

/// Drive one orchestration instance of `definition` to termination and return
/// its final answer.
///
/// The conversation is seeded with the agent's system prompt and the initial
/// user message, then the loop alternates between completion calls and tool
/// dispatch until a reply carries no tool calls. Tool calls within one batch
/// run strictly left-to-right, and every result is appended before the next
/// completion query. Each completion call and each tool invocation is one
/// journal step, so a re-drive after a crash replays recorded results instead
/// of repeating side effects.
pub async fn run_instance(
    ctx: &RunnerContext,
    definition: &AgentDefinition,
    instance_id: &str,
    initial_user_message: &str,
) -> Result<String> {
    let mut journal = Journal::resume(Arc::clone(&ctx.journal_store), instance_id)
        .await
        .map_err(|error| AgentError::Journal(error.to_string()))?;

    let mut conversation = Conversation::new(instance_id);
    conversation.add_message(Message::system(definition.system_prompt()));
    conversation.add_message(Message::user(initial_user_message));

    let tool_schemas = definition.tool_schemas();

    log::debug!(
        "[{}] starting agent '{}' with {} tools",
        instance_id,
        definition.name(),
        tool_schemas.len()
    );

    loop {
        let reply: CompletionReply = journal
            .execute_once("completion", async {
                ctx.completion
                    .complete(definition.deployment(), &conversation.messages, &tool_schemas)
                    .await
            })
            .await
            .map_err(|error| match error {
                StepError::Journal(journal_error) => AgentError::Journal(journal_error.to_string()),
                StepError::Action(completion_error) => completion_error_to_agent(completion_error),
            })?;

        conversation.add_message(Message::assistant(
            reply.content.clone(),
            if reply.tool_calls.is_empty() {
                None
            } else {
                Some(reply.tool_calls.clone())
            },
        ));

        if reply.is_terminal() {
            log::info!(
                "[{}] agent '{}' terminated after {} steps",
                instance_id,
                definition.name(),
                journal.position()
            );
            return Ok(reply.content);
        }

        // Resolve every call in the batch before the next completion query,
        // in the order the completion service returned them.
        for call in &reply.tool_calls {
            let tool = definition
                .tool(&call.name)
                .ok_or_else(|| AgentError::UnknownTool {
                    agent: definition.name().to_string(),
                    tool: call.name.clone(),
                })?;

            let invocation = ToolInvocation {
                instance_id: instance_id.to_string(),
                call_id: call.id.clone(),
            };
            let label = format!("tool:{}", call.name);
            let arguments = call.arguments.clone();

            let content: String = journal
                .execute_once(&label, async {
                    match tool.execute(&invocation, arguments).await {
                        Ok(content) => Ok(content),
                        Err(ToolError::Fatal(message)) => {
                            Err(AgentError::Delegation(message))
                        }
                        // Any other handler failure is a runtime condition
                        // the model decides how to handle, not an instance
                        // failure.
                        Err(error) => {
                            log::warn!(
                                "[{}] tool '{}' failed: {}",
                                instance_id,
                                call.name,
                                error
                            );
                            Ok(format!("Tool '{}' failed: {}", call.name, error))
                        }
                    }
                })
                .await
                .map_err(|error| match error {
                    StepError::Journal(journal_error) => {
                        AgentError::Journal(journal_error.to_string())
                    }
                    StepError::Action(agent_error) => agent_error,
                })?;

            // Runs on replay as well, so state a tool derives from its own
            // results is rebuilt identically on a re-driven instance.
            tool.observe_result(&invocation, &content);

            conversation.add_message(Message::from_tool_result(ToolResult {
                tool_call_id: call.id.clone(),
                tool_name: call.name.clone(),
                content,
            }));
        }
    }
}

fn completion_error_to_agent(error: CompletionError) -> AgentError {
    AgentError::Completion(error.to_string())
}
