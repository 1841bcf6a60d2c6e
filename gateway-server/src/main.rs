use anyhow::Context;
use axum::Router;
use axum_sql_gateway::SqlGatewayLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod config;

use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env()?;

    let gateway = SqlGatewayLayer::postgres("");
    let registry = gateway.registry();

    let app = Router::new()
        .merge(gateway.into_router())
        .layer(TraceLayer::new_for_http());

    // Bind to the configured address and start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    let port = config.bind_addr.port();
    tracing::info!("SQL gateway running at http://localhost:{}", port);
    tracing::info!("Health check at http://localhost:{}/api/health", port);
    tracing::info!("API: POST /api/connect, /api/query, /api/schema, /api/disconnect");
    tracing::info!("Only read queries (SELECT, WITH) are executed");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let closed = registry.close_all().await;
    tracing::info!(closed, "Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, closing connections");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, closing connections");
        }
    }
}
