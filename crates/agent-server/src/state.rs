use std::sync::Arc;

use agent_orchestrator::ReportPipeline;
use chat_history::HistoryLedger;

/// Shared per-process state: the pipeline that builds agent graphs for each
/// run and the ledger every run appends its boundary turns to.
pub struct AppState {
    pub pipeline: ReportPipeline,
    pub ledger: Arc<HistoryLedger>,
}

impl AppState {
    pub fn new(pipeline: ReportPipeline) -> Self {
        Self {
            pipeline,
            ledger: Arc::new(HistoryLedger::new()),
        }
    }
}
