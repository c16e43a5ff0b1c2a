//! Timetable orchestrator - main entry point
//!
//! Serves the configuration, generation, approval and live timetable API.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timetable_common::config::load_toml_config_or_default;
use timetable_common::db::init_database;
use timetable_orchestrator::config::{Args, ServiceConfig, CONFIG_FILE_NAME};
use timetable_orchestrator::services::HttpEngine;
use timetable_orchestrator::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let loaded = load_toml_config_or_default(args.config.as_deref(), CONFIG_FILE_NAME);
    let config = ServiceConfig::resolve(&args, &loaded.config)
        .context("Invalid service configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The TOML file is read before logging exists; report the fallback now
    if let Some(reason) = &loaded.fallback_reason {
        warn!("{} (using defaults)", reason);
    }

    info!(
        "Starting timetable-orchestrator v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.listen_addr
    );
    info!("Database: {}", config.database_path.display());
    info!(
        "Optimization engine: {} (timeout {}s)",
        config.engine_url, config.engine_timeout_secs
    );

    let db = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let engine = HttpEngine::new(&config.engine_url, config.engine_timeout_secs)
        .context("Failed to create engine client")?;

    let state = AppState::new(db, Arc::new(engine));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("Failed to bind to address")?;

    info!("Listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
