use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub mod memory;
pub mod repository;
pub mod sqlite;

pub use memory::MemoryEventStore;
pub use repository::{EventStore, StoreError};
pub use sqlite::SqliteEventStore;

pub type DatabasePool = Pool<Sqlite>;

const MEMORY_LOCATION: &str = ":memory:";

/// Opens the event database at `location`.
///
/// Accepts a `sqlite:` URL, a plain file path or `:memory:`. The database
/// file is created when it does not exist yet.
pub async fn setup_database(location: &str, max_connections: u32) -> Result<DatabasePool> {
    info!(location, "Connecting to event database");

    let in_memory = is_memory_location(location);
    let options = connect_options(location)?;

    // every connection to :memory: is its own database, so keep a single one alive
    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(180))
    }
    .connect_with(options)
    .await?;

    let start_time = std::time::Instant::now();
    sqlx::query("SELECT 1").execute(&pool).await?;
    let connection_time = start_time.elapsed();

    info!(
        in_memory,
        "Database connection established successfully in {:?}", connection_time
    );

    Ok(pool)
}

pub async fn run_migrations(pool: &DatabasePool) -> Result<()> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations").run(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}

fn is_memory_location(location: &str) -> bool {
    location == MEMORY_LOCATION || location.trim_start_matches("sqlite:") == MEMORY_LOCATION
}

fn connect_options(location: &str) -> Result<SqliteConnectOptions> {
    let options = if is_memory_location(location) {
        SqliteConnectOptions::from_str("sqlite::memory:")?
    } else if location.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(location)?
    } else {
        SqliteConnectOptions::new().filename(location)
    };

    Ok(options.create_if_missing(true))
}
