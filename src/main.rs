use clap::Parser;
use llm_relay::cli::Cli;
use llm_relay::config::AppConfig;
use llm_relay::infrastructure::server::{self, ServerState};
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();
    info!("Starting llm-relay");

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_filename(path)?;
            info!(path = path.as_str(), "Loaded environment from file");
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    let config = AppConfig::from_env();
    let addr = cli.addr.unwrap_or(config.server.bind);

    debug!(cors_origin = config.server.cors_origin.as_str(), "Configuration loaded");
    let state = Arc::new(ServerState::from_config(&config));

    info!(%addr, "REST server starting");
    server::serve(state, addr, &config.server.cors_origin).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();
}
