mod api;
mod cli;
mod db;
mod import;
mod router;
mod startup;
mod state;

use clap::Parser;
use tracing::info;

use cli::{Cli, Command};

async fn serve(config: &coverdesk_core::Config) -> anyhow::Result<()> {
    config.log_summary();

    let state = startup::build_app_state(config).await;
    let app = router::build_router(state, &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    coverdesk_core::config::load_dotenv();
    let config = coverdesk_core::Config::from_env();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Import { file, force } => import::import_file(&config, &file, force).await,
    }
}
