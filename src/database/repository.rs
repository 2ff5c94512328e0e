//! Storage gateway contract for webhook events.
//!
//! The ingestion pipeline only ever talks to storage through [`EventStore`]:
//! - `insert` takes ownership of a mapped record
//! - `search` returns records matching every predicate of the criteria
//! - `health_check` is a cheap liveness check used by the health endpoint

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{EventRecord, SearchCriteria};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not encode {field}: {source}")]
    Encode {
        field: &'static str,
        source: serde_json::Error,
    },

    #[error("stored event {id} is unreadable: {reason}")]
    Corrupt { id: i64, reason: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Event storage trait, the only storage seam of the pipeline
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a record; the store assigns its id
    async fn insert(&self, record: EventRecord) -> Result<(), StoreError>;

    /// Find all records matching the criteria, oldest first
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<EventRecord>, StoreError>;

    /// Check that the store is reachable
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
