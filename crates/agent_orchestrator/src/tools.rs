use std::fmt::Write as _;
use std::sync::Arc;

use agent_core::{Tool, ToolError, ToolInvocation};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct DateArgs {
    #[serde(rename = "Year")]
    year: i32,
    month: u32,
}

fn date_args_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "Year": {
                "type": "integer",
                "description": "The year of the month to get the sales numbers"
            },
            "month": {
                "type": "integer",
                "description": "month to get the sales number. The number should be between 1 and 12 where 1 is for January, 2 for February and so on"
            }
        }
    })
}

/// Monthly sales aggregates for one dimension (product or country). The
/// upstream warehouse connector is an external collaborator; this handler
/// serves deterministic canned aggregates shaped like its query output.
pub struct SalesDataTool {
    name: &'static str,
    description: &'static str,
    dimension: &'static str,
    rows: &'static [&'static str],
}

impl SalesDataTool {
    pub fn by_product() -> Self {
        Self {
            name: "get_sales_data_by_product",
            description: "Get sales numbers aggregated by product for a given month and a year.",
            dimension: "Product",
            rows: &["HyperCharge Batteries", "VoltMax Chargers", "PowerCell Packs"],
        }
    }

    pub fn by_country() -> Self {
        Self {
            name: "get_sales_data_by_country",
            description: "Get sales numbers aggregated by country for a given month and a year.",
            dimension: "Country",
            rows: &["United States", "India", "Germany"],
        }
    }
}

#[async_trait]
impl Tool for SalesDataTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        date_args_schema()
    }

    async fn execute(
        &self,
        _invocation: &ToolInvocation,
        args: serde_json::Value,
    ) -> Result<String, ToolError> {
        let args: DateArgs = serde_json::from_value(args)
            .map_err(|error| ToolError::InvalidArguments(error.to_string()))?;

        if !(1..=12).contains(&args.month) {
            return Err(ToolError::InvalidArguments(format!(
                "month must be between 1 and 12, got {}",
                args.month
            )));
        }

        let mut table = format!(
            "{} | sum(Sales) for {}-{:02}\n",
            self.dimension, args.year, args.month
        );
        for (index, row) in self.rows.iter().enumerate() {
            // Stable figures derived from the requested period.
            let sales =
                500_000 + (args.year as i64 % 100) * 10_000 + args.month as i64 * 1_000 * (index as i64 + 1);
            let _ = writeln!(table, "{} | {}", row, sales);
        }
        Ok(table)
    }
}

/// Reporting policy document the reviewer consults. Stands in for the
/// document-store connector, which is outside this crate's boundary.
pub struct PolicyDocTool;

const REPORTING_POLICY: &str = "\
# Sales Reporting Policy\n\
\n\
1. Reports must include a forward-looking statements disclaimer.\n\
2. Revenue figures must reference the source data range.\n\
3. Month-over-month comparisons must name both months explicitly.\n";

#[async_trait]
impl Tool for PolicyDocTool {
    fn name(&self) -> &str {
        "get_reporting_policy_list"
    }

    fn description(&self) -> &str {
        "Get sales forecast report writing policy. The policies are written in md format"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(
        &self,
        _invocation: &ToolInvocation,
        _args: serde_json::Value,
    ) -> Result<String, ToolError> {
        Ok(REPORTING_POLICY.to_string())
    }
}

/// One-way destination for an approved final draft (mail-out, blob upload).
pub trait DraftSink: Send + Sync {
    fn publish(&self, final_draft: &str);
}

/// Default sink: records the publication in the log and drops the draft.
#[derive(Debug, Default)]
pub struct LoggingDraftSink;

impl DraftSink for LoggingDraftSink {
    fn publish(&self, final_draft: &str) {
        log::info!("publishing final draft ({} chars)", final_draft.len());
    }
}

#[derive(Debug, Deserialize)]
struct PublishArgs {
    final_draft: String,
}

/// Terminal branch of the pipeline: sends the approved draft to the sink and
/// returns an empty result, so the supervisor does not reason further on it.
pub struct PublishTool {
    sink: Arc<dyn DraftSink>,
}

impl PublishTool {
    pub fn new(sink: Arc<dyn DraftSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Tool for PublishTool {
    fn name(&self) -> &str {
        "publisher_agent"
    }

    fn description(&self) -> &str {
        "The publisher agent that publishes the approved final draft of the report"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "final_draft": {
                    "type": "string",
                    "description": "Final draft of the report to be published"
                }
            }
        })
    }

    async fn execute(
        &self,
        _invocation: &ToolInvocation,
        args: serde_json::Value,
    ) -> Result<String, ToolError> {
        let args: PublishArgs = serde_json::from_value(args)
            .map_err(|error| ToolError::InvalidArguments(error.to_string()))?;
        self.sink.publish(&args.final_draft);
        Ok(String::new())
    }
}
