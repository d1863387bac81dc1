//! SparkyFitness MCP server entrypoint.
//!
//! Loads configuration from the environment (optionally seeded from a `.env` file), installs
//! logging, and serves the food tools over the configured transport until the client
//! disconnects or the process receives Ctrl-C / SIGTERM.
use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use sparkyfitness_mcp::{
    config::Config,
    logging,
    mcp::SparkyFitnessMcpServer,
    sparkyfitness::SparkyFitnessClient,
    transport,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(
    name = "sparkyfitness-mcp",
    version,
    about = "MCP server exposing the SparkyFitness food database"
)]
struct Cli {
    /// Load environment variables from this file before reading configuration.
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let config = Config::from_env().context("failed to load configuration")?;
    let _log_guard =
        logging::init_tracing(&config.logging).context("failed to initialize logging")?;

    tracing::info!(
        transport = %config.transport,
        api_url = %config.api_url,
        log_level = %config.logging.level,
        log_format = ?config.logging.format,
        "Starting SparkyFitness MCP server"
    );

    let client =
        SparkyFitnessClient::new(&config).context("failed to create SparkyFitness client")?;
    let server = SparkyFitnessMcpServer::new(Arc::new(client));

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    transport::run(server, &config, shutdown)
        .await
        .context("MCP server terminated unexpectedly")?;

    tracing::info!("SparkyFitness MCP server stopped");
    Ok(())
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    wait_for_signal().await;
    tracing::info!("Received shutdown signal");
    shutdown.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(error = %err, "SIGTERM handler unavailable; listening for Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
