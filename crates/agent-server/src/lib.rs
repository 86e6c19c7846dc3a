//! HTTP host for the report pipeline: a report run endpoint, the shared
//! chat history feed, and a health probe.

pub mod handlers;
pub mod server;
pub mod state;

pub use server::{api_config, run_server};
pub use state::AppState;
