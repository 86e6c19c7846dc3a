//! Delegation graph and the report pipeline.
//!
//! A [`DelegateTool`] is a tool handler whose implementation is "run a child
//! orchestration instance to termination and return its final answer". The
//! report pipeline composes one supervisor instance over writer, reviewer and
//! publisher agents this way; only answer strings cross agent boundaries.

pub mod delegate;
pub mod pipeline;
pub mod tools;

pub use delegate::DelegateTool;
pub use pipeline::{run_report, PipelineError, ReportPipeline};
pub use tools::{DraftSink, LoggingDraftSink, PolicyDocTool, PublishTool, SalesDataTool};
