use std::path::PathBuf;
use std::sync::Arc;

use agent_journal::JsonlJournal;
use agent_llm::{load_agent_connection, OpenAIClient};
use agent_loop::RunnerContext;
use agent_orchestrator::ReportPipeline;
use agent_server::{run_server, AppState};
use clap::Parser;

#[derive(Parser)]
#[command(name = "agent-server")]
#[command(about = "HTTP host for the sales report agent pipeline")]
#[command(version)]
struct Cli {
    #[arg(long, default_value = "8080", env = "APP_PORT")]
    port: u16,

    /// Path to the agent connections file
    #[arg(long, default_value = "connections.json")]
    connections: PathBuf,

    /// Named connection entry to use for the completion service
    #[arg(long, default_value = "agent")]
    connection: String,

    /// Model deployment all agents run on
    #[arg(long, default_value = "gpt-4o")]
    deployment: String,

    /// Directory instance journals are written to
    #[arg(long, default_value = ".journals")]
    journal_dir: PathBuf,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    let connection = load_agent_connection(&cli.connections, &cli.connection).map_err(|error| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, error.to_string())
    })?;

    let completion = Arc::new(
        OpenAIClient::new(connection.api_key).with_base_url(connection.endpoint),
    );
    let store = Arc::new(JsonlJournal::new(&cli.journal_dir));
    store.init().await?;

    let ctx = RunnerContext::new(completion, store);
    let state = AppState::new(ReportPipeline::new(ctx, &cli.deployment));

    log::info!("starting agent server on http://0.0.0.0:{}", cli.port);
    run_server(state, cli.port).await
}
