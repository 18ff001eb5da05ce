//! Distiller - A read-through cache for decentralized content networks
//!
//! Runs the HTTP read surface over an in-memory cache backed by Hive.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use distiller::{
    api::create_router,
    cache::MemoryStore,
    remote::{HiveClient, HiveConfig, SourceRegistry},
    AppState, Config, Distiller, SourceSystem,
};

/// Main entry point for the distiller server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the Hive client and source registry
/// 4. Create the cache store and distiller
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "distiller=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Distiller");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_expire={}s, nodes={}, port={}",
        config.default_expire_secs,
        config.hive_nodes.len(),
        config.server_port
    );

    let hive = HiveClient::new(HiveConfig::from(&config)).context("failed to build Hive client")?;
    let sources = SourceRegistry::new(SourceSystem::Hive).with_client(SourceSystem::Hive, Arc::new(hive));
    let distiller = Distiller::from_config(&config, Arc::new(MemoryStore::new()), sources);
    info!("Cache store initialized");

    let app = create_router(AppState::new(distiller));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
