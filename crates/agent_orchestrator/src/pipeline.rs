//! Sales performance report pipeline.
//!
//! One supervisor instance drives three subordinates: a writer agent and a
//! reviewer agent, each a full child orchestration run behind a
//! [`DelegateTool`], and a publisher which is a plain tool. The supervisor's
//! revision cycle (draft, review, redraft until approved) happens entirely
//! through its own completion turns; the only cross-agent channel besides
//! tool arguments is the latest writer draft, retained per run so a redraft
//! request can include the draft the feedback refers to.

use std::sync::{Arc, Mutex};

use agent_core::{AgentDefinition, AgentError, RegistryError, Role, ToolError};
use agent_loop::{run_instance, RunnerContext};
use chat_history::{EntryType, HistoryLedger};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::delegate::DelegateTool;
use crate::tools::{DraftSink, LoggingDraftSink, PolicyDocTool, PublishTool, SalesDataTool};

const SUPERVISOR_PROMPT: &str = "\
You are a supervisor who coordinates the work between different agents for \
producing a sales performance report.\n\n\
You will be asked to produce a sales performance report for a given time \
period such as January 2025.\n\n\
You will first ask the writer agent, who can gather data from enterprise \
systems and draft a narrative report with business insights, by passing the \
time range and any specific instructions to produce a draft.\n\n\
Once the writer produces a draft, you will send the draft to the reviewer \
agent who will either approve the report or request updates providing review \
feedback to be addressed.\n\n\
If the report is approved by the reviewer you will send it to the publisher \
agent for publication.\n\n\
If updates are requested, you will send this feedback to the writer and the \
writer will produce an updated draft which you will send back to the \
reviewer. You will continue this process until the report is approved.";

const WRITER_PROMPT: &str = "\
You are being tasked to write a detailed sales performance report. You have \
access to monthly sales records for the last two years.\n\n\
You may also be provided with a previous draft of a report with detailed \
feedback, and you will update the previous draft to incorporate the feedback \
while adhering to the original guidance.\n\n\
Your responsibilities:\n\
- Pull raw data from the tools provided.\n\
- Generate a structured report draft, providing:\n\
  1. Textual summary of month-over-month changes, highlight bullet points.\n\
  2. Data references (e.g., top-line revenue figures).\n\
  3. (Optional) Basic chart suggestions or placeholders.\n\n\
You will also be provided a date range for the report, for example March \
2025, and any special instructions (e.g., \"Focus on new product line\", \
\"Compare to last year's forecast\").\n\n\
Your draft report should contain the following:\n\
1. Text narrative (\"April revenue reached $2.1M, up 5% from March...\").\n\
2. Key metrics (tables, bullet points).\n\
3. References to raw data, so the reviewer can spot-check if needed.";

const REVIEWER_PROMPT: &str = "\
You are a report reviewer responsible for reviewing sales performance \
reports.\n\n\
You will be given a draft report and your responsibilities are the \
following:\n\n\
1. Verify the accuracy of key figures (spot-check top-line revenue, margin, \
etc.).\n\
2. Ensure brand/legal compliance (e.g., disclaimers for forward-looking \
statements, correct tone, no unauthorized claims).\n\
3. Provide feedback if issues are found or disclaimers are missing.\n\
4. Approve the report if everything is correct.\n\n\
You are expected to reply with the following:\n\n\
Review state: Approved if the draft requires no changes\n\n\
Otherwise,\n\n\
Review state: Require Updates\n\
Review Feedback: <detailed feedback>";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline setup failed: {0}")]
    Setup(#[from] RegistryError),
    #[error(transparent)]
    Run(#[from] AgentError),
}

#[derive(Debug, Deserialize)]
struct WriterRequest {
    report_period: String,
    #[serde(default)]
    previous_draft_feedback: String,
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
    report_period: String,
    #[serde(default)]
    report_draft: String,
}

/// Builds the agent graph for report runs. Definitions are assembled fresh
/// per run because the writer delegate carries that run's draft state.
pub struct ReportPipeline {
    ctx: RunnerContext,
    deployment: String,
    sink: Arc<dyn DraftSink>,
}

impl ReportPipeline {
    pub fn new(ctx: RunnerContext, deployment: impl Into<String>) -> Self {
        Self {
            ctx,
            deployment: deployment.into(),
            sink: Arc::new(LoggingDraftSink),
        }
    }

    /// Replace the publication sink (the default only logs).
    pub fn with_sink(mut self, sink: Arc<dyn DraftSink>) -> Self {
        self.sink = sink;
        self
    }

    fn writer_definition(&self) -> Result<AgentDefinition, RegistryError> {
        AgentDefinition::new("writer", WRITER_PROMPT, &self.deployment)
            .with_tool(SalesDataTool::by_product())?
            .with_tool(SalesDataTool::by_country())
    }

    fn reviewer_definition(&self) -> Result<AgentDefinition, RegistryError> {
        AgentDefinition::new("reviewer", REVIEWER_PROMPT, &self.deployment)
            .with_tool(PolicyDocTool)
    }

    fn supervisor_definition(&self) -> Result<AgentDefinition, RegistryError> {
        let latest_draft: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let writer = self.writer_definition()?;
        let draft_for_input = latest_draft.clone();
        let draft_for_answer = latest_draft.clone();
        let writer_delegate = DelegateTool::new(
            "writer_agent",
            "The writer agent that can gather data from enterprise systems and draft a narrative report with business insights",
            json!({
                "type": "object",
                "properties": {
                    "report_period": {
                        "type": "string",
                        "description": "The requested report period (for example January 2025)"
                    },
                    "previous_draft_feedback": {
                        "type": "string",
                        "description": "Feedback from the previous draft. If there is no previous draft, indicate that there is no feedback since there is no draft yet"
                    }
                }
            }),
            writer,
            self.ctx.clone(),
            move |args| {
                let request: WriterRequest = serde_json::from_value(args.clone())
                    .map_err(|error| ToolError::InvalidArguments(error.to_string()))?;
                let previous = draft_for_input
                    .lock()
                    .expect("draft state lock poisoned")
                    .clone()
                    .unwrap_or_default();
                Ok(writer_input(
                    &request.report_period,
                    &previous,
                    &request.previous_draft_feedback,
                ))
            },
        )
        .on_answer(move |answer| {
            *draft_for_answer.lock().expect("draft state lock poisoned") =
                Some(answer.to_string());
        });

        let reviewer = self.reviewer_definition()?;
        let reviewer_delegate = DelegateTool::new(
            "reviewer_agent",
            "The reviewer agent who will either approve the report or request updates providing review feedback to be addressed",
            json!({
                "type": "object",
                "properties": {
                    "report_period": {
                        "type": "string",
                        "description": "The requested report period (for example January 2025)"
                    },
                    "report_draft": {
                        "type": "string",
                        "description": "Draft of the report"
                    }
                }
            }),
            reviewer,
            self.ctx.clone(),
            |args| {
                let request: ReviewRequest = serde_json::from_value(args.clone())
                    .map_err(|error| ToolError::InvalidArguments(error.to_string()))?;
                Ok(reviewer_input(&request.report_period, &request.report_draft))
            },
        );

        AgentDefinition::new("supervisor", SUPERVISOR_PROMPT, &self.deployment)
            .with_tool(writer_delegate)?
            .with_tool(reviewer_delegate)?
            .with_tool(PublishTool::new(self.sink.clone()))
    }
}

fn writer_input(report_period: &str, previous_draft: &str, feedback: &str) -> String {
    format!(
        "*****Date range****\n{report_period}\n\n\
         if there was a previous draft, they will be provided below. if they \
         are present please incorporate the feedback while adhering to the \
         original guidance.\n\n\
         *****Previous Draft****\n``\n{previous_draft}\n``\n\n\
         **** review feedback ***\n``\n{feedback}\n``"
    )
}

fn reviewer_input(report_period: &str, report_draft: &str) -> String {
    format!(
        "Below is the draft of the sales performance report for the time \
         period {report_period}\n\n``\n{report_draft}\n``"
    )
}

/// Run one report request to completion under `run_id`.
///
/// Exactly two ledger records come out of a successful run: the inbound
/// request before the supervisor starts and the final answer after it
/// terminates. Intermediate turns live in the instance journals, not the
/// shared ledger.
pub async fn run_report(
    pipeline: &ReportPipeline,
    ledger: &HistoryLedger,
    run_id: &str,
    report_period: &str,
) -> Result<String, PipelineError> {
    let supervisor = pipeline.supervisor_definition()?;
    let request = format!("the requested report period is {report_period}");

    ledger.record(EntryType::Content, Role::User, &request);
    log::info!("[{run_id}] starting report run for period '{report_period}'");

    let answer = run_instance(&pipeline.ctx, &supervisor, run_id, &request).await?;

    ledger.record(EntryType::Content, Role::Assistant, &answer);
    log::info!("[{run_id}] report run finished");
    Ok(answer)
}
