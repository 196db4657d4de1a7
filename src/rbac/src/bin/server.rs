//! # Authorization HTTP Server
//!
//! Serves the TETRIX authorization model over HTTP. See
//! [`tetrix_rbac::config`] for the environment variables it reads.

use anyhow::Context;
use axum::serve;
use std::net::SocketAddr;
use std::sync::Arc;
use tetrix_rbac::{
    http::{create_metrics_router, create_router, AppState},
    AuthorizationEngine, RevocationList, ServerConfig,
};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("Starting graceful shutdown");
}

/// Main server entrypoint
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TETRIX Authorization Server v{}", tetrix_rbac::VERSION);

    let config = ServerConfig::from_env();

    info!("Configuration:");
    info!("  Port: {}", config.port);
    info!("  Metrics Port: {}", config.metrics_port);
    info!("  Cache Size: {}", config.cache_size);
    info!("  Revocation TTL: {}s", config.revocation_ttl_secs);

    // An invalid model must stop startup
    let model = config
        .model_definition()
        .and_then(|definition| definition.load())
        .context("failed to load authorization model")?;

    let engine = Arc::new(AuthorizationEngine::with_config(model, config.engine_config()));
    let revocations = Arc::new(RevocationList::with_ttl(config.revocation_ttl()));
    let state = AppState::with_revocations(engine, revocations);

    let app = create_router(state.clone()).context("failed to build router")?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let metrics_app = create_metrics_router(state);
    let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));

    info!("Starting HTTP server on {}", addr);
    info!("Starting metrics server on {}", metrics_addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP server on {}", addr))?;

    let metrics_listener = tokio::net::TcpListener::bind(metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics server on {}", metrics_addr))?;

    let server = serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    let metrics_server = serve(metrics_listener, metrics_app.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    tokio::try_join!(
        async {
            server.await.map_err(|e| {
                error!("HTTP server error: {}", e);
                e
            })
        },
        async {
            metrics_server.await.map_err(|e| {
                error!("Metrics server error: {}", e);
                e
            })
        }
    )?;

    info!("Servers shut down gracefully");
    Ok(())
}
