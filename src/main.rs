use std::net::SocketAddr;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zt_event_logger::{Config, router, startup};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (reads .env first)
    let config = Config::from_env()?;

    // Initialize tracing, RUST_LOG wins over LOG_LEVEL
    let subscriber = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
    );
    if config.environment == "production" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("Loaded configuration for environment: {}", config.environment);

    let app_state = startup::initialize_app(&config).await?;
    let app = router::build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting event logger on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(startup::shutdown_signal())
        .await?;

    Ok(())
}
