//! Scripted completion client for loop and orchestration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use agent_core::{Message, ToolSchema};
use async_trait::async_trait;

use crate::provider::{CompletionClient, CompletionError, CompletionReply, Result};

/// Returns canned replies in order, keyed by deployment so one client can
/// script several agent roles at once. Counts calls and captures each request
/// so tests can assert that replayed instances never hit the service again
/// and that prompts were shaped as expected.
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<HashMap<String, Vec<CompletionReply>>>,
    requests: Mutex<Vec<(String, Vec<Message>)>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `reply` as the next turn for `deployment`.
    pub fn push(&self, deployment: &str, reply: CompletionReply) {
        self.scripts
            .lock()
            .expect("script lock poisoned")
            .entry(deployment.to_string())
            .or_default()
            .push(reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request seen so far, as (deployment, message transcript) pairs
    /// in call order.
    pub fn requests(&self) -> Vec<(String, Vec<Message>)> {
        self.requests.lock().expect("request lock poisoned").clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        deployment: &str,
        messages: &[Message],
        _tools: &[ToolSchema],
    ) -> Result<CompletionReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("request lock poisoned")
            .push((deployment.to_string(), messages.to_vec()));

        let mut scripts = self.scripts.lock().expect("script lock poisoned");
        let queue = scripts
            .get_mut(deployment)
            .ok_or_else(|| CompletionError::Api(format!("no script for '{deployment}'")))?;

        if queue.is_empty() {
            return Err(CompletionError::Api(format!(
                "script for '{deployment}' exhausted"
            )));
        }
        Ok(queue.remove(0))
    }
}
