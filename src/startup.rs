//! Application startup and initialization logic.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::app_state::AppState;
use crate::config::{Config, SignatureMode};
use crate::database::{self, SqliteEventStore};

/// Open storage, run migrations and create the AppState.
pub async fn initialize_app(config: &Config) -> Result<AppState> {
    info!(environment = %config.environment, "Starting ZeroTier event logger");

    let db_pool = database::setup_database(&config.db_file_location, config.max_connections)
        .await
        .with_context(|| format!("failed to open database at {}", config.db_file_location))?;
    info!("✅ SQLite connection established");

    database::run_migrations(&db_pool).await?;
    info!("✅ Database migrations completed");

    log_signature_mode(config);

    let store = Arc::new(SqliteEventStore::new(db_pool));
    Ok(AppState::new(config.clone(), store))
}

fn log_signature_mode(config: &Config) {
    match &config.signature_mode {
        SignatureMode::Enforced { .. } => info!(
            tolerance_secs = config.signature_tolerance.as_secs(),
            "✅ Webhook signature verification enabled"
        ),
        SignatureMode::Bypass => warn!(
            "PRE_SHARED_KEY is not set; webhook signatures will not be verified"
        ),
    }
}

/// Wait for shutdown signal.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
