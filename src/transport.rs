//! Transports serving the MCP server over stdio or streamable HTTP.

use std::{io, time::Duration};

use axum::Router;
use rmcp::{service::ServiceExt, transport::stdio};
use thiserror::Error;
use tokio::{net::TcpListener, task::JoinError};
use tokio_util::sync::CancellationToken;

use crate::{
    api::{self, MCP_PATH},
    config::{Config, TransportMode},
    mcp::SparkyFitnessMcpServer,
};

/// How long in-flight HTTP requests may take to finish once shutdown starts.
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Errors that end a transport run.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP listener could not be bound.
    #[error("failed to bind HTTP listener on {address}: {source}")]
    Bind {
        /// Address we attempted to bind.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The HTTP server failed while serving connections.
    #[error("HTTP server error: {0}")]
    Serve(#[source] io::Error),
    /// The stdio MCP session could not complete its handshake.
    #[error("failed to start MCP server over stdio: {0}")]
    Initialize(String),
    /// A transport task panicked or was cancelled.
    #[error("transport task failed: {0}")]
    Join(#[from] JoinError),
    /// Connections were still open when the grace period ran out.
    #[error("HTTP server did not shut down within {0:?}")]
    ShutdownTimeout(Duration),
}

/// Serve `server` on the transport selected by `config` until it stops or `shutdown` fires.
pub async fn run(
    server: SparkyFitnessMcpServer,
    config: &Config,
    shutdown: CancellationToken,
) -> Result<(), TransportError> {
    match config.transport {
        TransportMode::Stdio => run_stdio(server, shutdown).await,
        TransportMode::Http => run_http(server, config, shutdown).await,
    }
}

/// Serve over stdin/stdout until the client disconnects or `shutdown` fires.
pub async fn run_stdio(
    server: SparkyFitnessMcpServer,
    shutdown: CancellationToken,
) -> Result<(), TransportError> {
    tracing::info!("Starting MCP server (stdio)");

    let service = server
        .serve(stdio())
        .await
        .map_err(|err| TransportError::Initialize(err.to_string()))?;

    let session = service.cancellation_token();
    let watcher = tokio::spawn(async move {
        shutdown.cancelled().await;
        tracing::info!("Shutdown requested; closing stdio session");
        session.cancel();
    });

    let outcome = service.waiting().await;
    watcher.abort();
    let reason = outcome?;
    tracing::info!(reason = ?reason, "MCP stdio session ended");
    Ok(())
}

/// Serve the MCP endpoint over HTTP on the configured address.
pub async fn run_http(
    server: SparkyFitnessMcpServer,
    config: &Config,
    shutdown: CancellationToken,
) -> Result<(), TransportError> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| TransportError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(
        address = %address,
        endpoint = %format!("http://{address}{MCP_PATH}/"),
        basic_auth = config.basic_auth_enabled(),
        session_idle_timeout_secs = config.session_idle_timeout.as_secs(),
        "Starting MCP server (HTTP)"
    );

    let router = api::create_router(
        server,
        config.basic_auth.clone(),
        config.session_idle_timeout,
    );
    serve_router(listener, router, shutdown).await
}

async fn serve_router(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), TransportError> {
    let mut server_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
        }
    });

    tokio::select! {
        joined = &mut server_task => return joined?.map_err(TransportError::Serve),
        () = shutdown.cancelled() => {}
    }

    tracing::info!("Shutting down HTTP server");
    match tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, &mut server_task).await {
        Ok(joined) => {
            joined?.map_err(TransportError::Serve)?;
            tracing::info!("HTTP server stopped");
            Ok(())
        }
        Err(_) => {
            server_task.abort();
            tracing::warn!(
                grace_period_secs = SHUTDOWN_GRACE_PERIOD.as_secs(),
                "HTTP server did not stop in time; aborting"
            );
            Err(TransportError::ShutdownTimeout(SHUTDOWN_GRACE_PERIOD))
        }
    }
}
