//! Trainer SOAP server
//!
//! Builds the store and service explicitly, serves `POST /soap` until
//! Ctrl-C, then drains the database pool.

use std::sync::Arc;

use clap::Parser;
use trainer_soap::config::ServerConfig;
use trainer_soap::{
    soap, MemoryTrainerStore, PostgresTrainerStore, TrainerService, TrainerStore, APP_VERSION,
};

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cfg = ServerConfig::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cfg.log_filter().into()),
        )
        .init();

    tracing::info!("Trainer SOAP v{}", APP_VERSION);

    let postgres = match cfg.database_url.as_deref() {
        Some(url) => {
            tracing::info!(max_connections = cfg.db_max_connections, "Connecting to Postgres");
            Some(PostgresTrainerStore::connect(url, cfg.db_max_connections).await?)
        }
        None => None,
    };

    let store: Arc<dyn TrainerStore> = match &postgres {
        Some(pg) => {
            if cfg.seed {
                tracing::warn!("--seed only applies to the memory store, ignoring");
            }
            Arc::new(pg.clone())
        }
        None if cfg.seed => {
            tracing::info!("Using memory store with demo trainers");
            Arc::new(MemoryTrainerStore::seeded())
        }
        None => {
            tracing::info!("Using memory store (set DATABASE_URL for Postgres)");
            Arc::new(MemoryTrainerStore::new())
        }
    };

    let service = TrainerService::new(store);
    let app = soap::router(service);

    let addr: std::net::SocketAddr = cfg.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pg) = postgres {
        pg.close().await;
        tracing::info!("Database pool closed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
