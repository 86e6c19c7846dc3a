use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use agent_core::{
    AgentDefinition, AgentError, Message, Role, Tool, ToolCall, ToolError, ToolInvocation,
    ToolSchema,
};
use agent_journal::MemoryJournal;
use agent_llm::{CompletionClient, CompletionError, CompletionReply};
use agent_loop::{run_instance, RunnerContext};
use async_trait::async_trait;
use serde_json::json;

/// Completion double that serves a fixed sequence of replies (or scripted
/// failures) and keeps every request it saw, so tests can assert what the
/// model would have conditioned on.
#[derive(Default)]
struct StubCompletion {
    replies: Mutex<VecDeque<Result<CompletionReply, String>>>,
    requests: Mutex<Vec<Vec<Message>>>,
    calls: AtomicUsize,
}

impl StubCompletion {
    fn new(replies: Vec<Result<CompletionReply, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for StubCompletion {
    async fn complete(
        &self,
        _deployment: &str,
        messages: &[Message],
        _tools: &[ToolSchema],
    ) -> agent_llm::Result<CompletionReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(messages.to_vec());

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(CompletionError::Api(message)),
            None => Err(CompletionError::Api("script exhausted".to_string())),
        }
    }
}

/// Tool that records the order it was invoked in and counts both handler
/// invocations and result observations separately.
struct TracingTool {
    name: &'static str,
    order: Arc<Mutex<Vec<String>>>,
    invocations: Arc<AtomicUsize>,
    observations: Arc<Mutex<Vec<String>>>,
    reply: &'static str,
}

#[async_trait]
impl Tool for TracingTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "test tool"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(
        &self,
        _invocation: &ToolInvocation,
        _args: serde_json::Value,
    ) -> Result<String, ToolError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.order.lock().unwrap().push(self.name.to_string());
        Ok(self.reply.to_string())
    }

    fn observe_result(&self, _invocation: &ToolInvocation, content: &str) {
        self.observations.lock().unwrap().push(content.to_string());
    }
}

struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "flaky_source"
    }

    fn description(&self) -> &str {
        "always unreachable"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(
        &self,
        _invocation: &ToolInvocation,
        _args: serde_json::Value,
    ) -> Result<String, ToolError> {
        Err(ToolError::Execution("data source unreachable".to_string()))
    }
}

fn call(id: &str, name: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: json!({}),
    }
}

fn context(completion: Arc<StubCompletion>, store: Arc<MemoryJournal>) -> RunnerContext {
    RunnerContext::new(completion, store)
}

#[tokio::test]
async fn terminates_on_first_reply_without_tool_calls() {
    let completion = Arc::new(StubCompletion::new(vec![Ok(CompletionReply::text(
        "final answer",
    ))]));
    let ctx = context(completion.clone(), Arc::new(MemoryJournal::new()));
    let definition = AgentDefinition::new("assistant", "You answer.", "gpt-4o");

    let answer = run_instance(&ctx, &definition, "run-1", "hello")
        .await
        .unwrap();

    assert_eq!(answer, "final answer");
    assert_eq!(completion.calls(), 1);

    // The single request carries the seeded system prompt and user message.
    let request = &completion.requests()[0];
    assert_eq!(request[0].role, Role::System);
    assert_eq!(request[1].role, Role::User);
    assert_eq!(request[1].content, "hello");
}

#[tokio::test]
async fn batch_of_tool_calls_runs_in_order_before_next_completion() {
    let completion = Arc::new(StubCompletion::new(vec![
        Ok(CompletionReply::tool_calls(vec![
            call("call_0", "first_tool"),
            call("call_1", "second_tool"),
        ])),
        Ok(CompletionReply::text("done")),
    ]));
    let order = Arc::new(Mutex::new(Vec::new()));
    let invocations = Arc::new(AtomicUsize::new(0));
    let observations = Arc::new(Mutex::new(Vec::new()));

    let definition = AgentDefinition::new("assistant", "You answer.", "gpt-4o")
        .with_tool(TracingTool {
            name: "second_tool",
            order: order.clone(),
            invocations: invocations.clone(),
            observations: observations.clone(),
            reply: "result b",
        })
        .and_then(|definition| {
            definition.with_tool(TracingTool {
                name: "first_tool",
                order: order.clone(),
                invocations: invocations.clone(),
                observations: observations.clone(),
                reply: "result a",
            })
        })
        .unwrap();

    let ctx = context(completion.clone(), Arc::new(MemoryJournal::new()));
    let answer = run_instance(&ctx, &definition, "run-1", "go")
        .await
        .unwrap();

    assert_eq!(answer, "done");
    assert_eq!(
        *order.lock().unwrap(),
        vec!["first_tool".to_string(), "second_tool".to_string()],
        "handlers run in the order the completion service returned them"
    );

    // Both tool results were appended before the second completion query.
    let second_request = &completion.requests()[1];
    let tail: Vec<(Role, Option<String>)> = second_request[second_request.len() - 2..]
        .iter()
        .map(|message| (message.role, message.tool_call_id.clone()))
        .collect();
    assert_eq!(
        tail,
        vec![
            (Role::Tool, Some("call_0".to_string())),
            (Role::Tool, Some("call_1".to_string())),
        ]
    );
}

#[tokio::test]
async fn unknown_tool_is_a_fatal_configuration_error() {
    let completion = Arc::new(StubCompletion::new(vec![
        Ok(CompletionReply::tool_calls(vec![call("call_0", "missing")])),
        Ok(CompletionReply::text("never reached")),
    ]));
    let store = Arc::new(MemoryJournal::new());
    let ctx = context(completion.clone(), store.clone());
    let definition = AgentDefinition::new("assistant", "You answer.", "gpt-4o");

    let error = run_instance(&ctx, &definition, "run-1", "go")
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        AgentError::UnknownTool { ref tool, .. } if tool == "missing"
    ));
    // The failed dispatch appended nothing: only the completion step was
    // journaled and the model was never queried again.
    assert_eq!(store.len("run-1"), 1);
    assert_eq!(completion.calls(), 1);
}

#[tokio::test]
async fn handler_failure_is_fed_back_as_tool_result_content() {
    let completion = Arc::new(StubCompletion::new(vec![
        Ok(CompletionReply::tool_calls(vec![call("call_0", "flaky_source")])),
        Ok(CompletionReply::text("answered without the data")),
    ]));
    let definition = AgentDefinition::new("assistant", "You answer.", "gpt-4o")
        .with_tool(FailingTool)
        .unwrap();

    let ctx = context(completion.clone(), Arc::new(MemoryJournal::new()));
    let answer = run_instance(&ctx, &definition, "run-1", "go")
        .await
        .unwrap();

    assert_eq!(answer, "answered without the data");
    let second_request = &completion.requests()[1];
    let tool_message = second_request.last().unwrap();
    assert_eq!(tool_message.role, Role::Tool);
    assert!(tool_message.content.contains("data source unreachable"));
}

#[tokio::test]
async fn replay_after_crash_reproduces_answer_without_rerunning_handlers() {
    let store = Arc::new(MemoryJournal::new());
    let order = Arc::new(Mutex::new(Vec::new()));
    let invocations = Arc::new(AtomicUsize::new(0));
    let observations = Arc::new(Mutex::new(Vec::new()));

    let make_definition = |invocations: &Arc<AtomicUsize>| {
        AgentDefinition::new("assistant", "You answer.", "gpt-4o")
            .with_tool(TracingTool {
                name: "lookup",
                order: order.clone(),
                invocations: invocations.clone(),
                observations: observations.clone(),
                reply: "42",
            })
            .unwrap()
    };

    // First drive: completion and tool steps get journaled, then the
    // completion service becomes unreachable mid-run.
    let crashing = Arc::new(StubCompletion::new(vec![
        Ok(CompletionReply::tool_calls(vec![call("call_0", "lookup")])),
        Err("connection reset".to_string()),
    ]));
    let ctx = context(crashing.clone(), store.clone());
    let definition = make_definition(&invocations);
    let error = run_instance(&ctx, &definition, "run-1", "what is the answer?")
        .await
        .unwrap_err();
    assert!(matches!(error, AgentError::Completion(_)));
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(store.len("run-1"), 2);

    // Re-drive the same instance: recorded steps replay, only the failed
    // completion runs live, and the handler is not invoked a second time.
    let recovered = Arc::new(StubCompletion::new(vec![Ok(CompletionReply::text(
        "the answer is 42",
    ))]));
    let ctx = context(recovered.clone(), store.clone());
    let definition = make_definition(&invocations);
    let answer = run_instance(&ctx, &definition, "run-1", "what is the answer?")
        .await
        .unwrap();

    assert_eq!(answer, "the answer is 42");
    assert_eq!(invocations.load(Ordering::SeqCst), 1, "handler not re-invoked");
    assert_eq!(recovered.calls(), 1, "only the unrecorded step hit the service");
    assert_eq!(store.len("run-1"), 3);

    // A third drive is a pure replay and produces the identical answer.
    let idle = Arc::new(StubCompletion::new(vec![]));
    let ctx = context(idle.clone(), store.clone());
    let definition = make_definition(&invocations);
    let answer = run_instance(&ctx, &definition, "run-1", "what is the answer?")
        .await
        .unwrap();
    assert_eq!(answer, "the answer is 42");
    assert_eq!(idle.calls(), 0);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);

    // The result observation fires on every drive with the recorded content,
    // so state derived from tool results is rebuilt identically on replay.
    assert_eq!(
        *observations.lock().unwrap(),
        vec!["42".to_string(), "42".to_string(), "42".to_string()]
    );
}
