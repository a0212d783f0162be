use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use mailbox_agent::config::{ConfigBuilder, Settings};
use mailbox_agent::{
    ArcadeClient, Console, DecisionResolver, RemoteGraph, RemoteGraphConfig, Session, ToolCatalog,
    ToolDefinition, TurnController,
};

const DEFAULT_LOG_LEVEL: &str = "warn";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run() -> mailbox_agent::Result<()> {
    let provider = ConfigBuilder::new().env().dotenv(".env")?.build();
    let settings = Settings::load(&provider).await?;

    let arcade = Arc::new(ArcadeClient::new(
        settings.arcade_base_url.clone(),
        settings.arcade_api_key.clone(),
    )?);
    let tools: Vec<String> = arcade
        .list_tools(&settings.catalog_query())
        .await?
        .iter()
        .map(ToolDefinition::agent_name)
        .collect();
    info!(tools = tools.len(), "Tools ready");

    let graph = RemoteGraph::new(
        RemoteGraphConfig::new(settings.server_url.clone())
            .assistant_id(settings.assistant_id.clone())
            .api_key(settings.agent_api_key.clone())
            .configurable("user_id", settings.user_id.clone())
            .configurable("model", settings.model.clone())
            .configurable("tools", tools),
    )?;

    let resolver = DecisionResolver::new(arcade).with_wait_timeout(settings.auth_wait_timeout);
    let controller =
        TurnController::new(Arc::new(graph), resolver).with_max_resumes(settings.max_resumes);
    let session = Session::new(controller, settings.thread_id.clone());

    let mut console = Console::stdio();
    let summary = session.run(&mut console).await?;
    info!(
        turns = summary.turns,
        failed = summary.failed_turns,
        "Exiting"
    );
    Ok(())
}
