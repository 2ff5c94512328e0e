use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::repository::{EventStore, StoreError};
use crate::events::HookType;
use crate::models::{EventRecord, JsonObject, SearchCriteria};

const EVENT_COLUMNS: &str = "id, hook_id, org_id, hook_type, network_id, member_id, user_id, \
     user_email, network_config, old_config, new_config, metadata, created_at";

/// SQLite-backed event store. Structured blobs are stored as JSON text.
#[derive(Debug, Clone)]
pub struct SqliteEventStore {
    pool: SqlitePool,
}

impl SqliteEventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    hook_id: String,
    org_id: String,
    hook_type: String,
    network_id: String,
    member_id: Option<String>,
    user_id: Option<String>,
    user_email: Option<String>,
    network_config: Option<String>,
    old_config: Option<String>,
    new_config: Option<String>,
    metadata: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for EventRecord {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(EventRecord {
            id: Some(id),
            hook_id: row.hook_id,
            org_id: row.org_id,
            hook_type: HookType::from_tag(&row.hook_type),
            network_id: row.network_id,
            member_id: row.member_id,
            user_id: row.user_id,
            user_email: row.user_email,
            network_config: decode_blob(id, "network_config", row.network_config)?,
            old_config: decode_blob(id, "old_config", row.old_config)?,
            new_config: decode_blob(id, "new_config", row.new_config)?,
            metadata: decode_blob(id, "metadata", row.metadata)?,
            created_at: row.created_at,
        })
    }
}

fn encode_blob(
    field: &'static str,
    blob: &Option<JsonObject>,
) -> Result<Option<String>, StoreError> {
    blob.as_ref()
        .map(|value| serde_json::to_string(value))
        .transpose()
        .map_err(|source| StoreError::Encode { field, source })
}

fn decode_blob(
    id: i64,
    field: &str,
    text: Option<String>,
) -> Result<Option<JsonObject>, StoreError> {
    text.map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(|e| StoreError::Corrupt {
            id,
            reason: format!("{field}: {e}"),
        })
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn insert(&self, record: EventRecord) -> Result<(), StoreError> {
        let network_config = encode_blob("network_config", &record.network_config)?;
        let old_config = encode_blob("old_config", &record.old_config)?;
        let new_config = encode_blob("new_config", &record.new_config)?;
        let metadata = encode_blob("metadata", &record.metadata)?;

        let result = sqlx::query(
            r"
            INSERT INTO events (
                hook_id, org_id, hook_type, network_id, member_id, user_id,
                user_email, network_config, old_config, new_config, metadata, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&record.hook_id)
        .bind(&record.org_id)
        .bind(record.hook_type.as_str())
        .bind(&record.network_id)
        .bind(&record.member_id)
        .bind(&record.user_id)
        .bind(&record.user_email)
        .bind(network_config)
        .bind(old_config)
        .bind(new_config)
        .bind(metadata)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        debug!(
            id = result.last_insert_rowid(),
            hook_id = %record.hook_id,
            "Event row inserted"
        );
        Ok(())
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<EventRecord>, StoreError> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events"));

        for (i, predicate) in criteria.predicates().iter().enumerate() {
            query.push(if i == 0 { " WHERE " } else { " AND " });
            query.push(predicate.column());
            query.push(" = ");
            query.push_bind(predicate.value().to_string());
        }
        query.push(" ORDER BY id");

        let rows: Vec<EventRow> = query.build_query_as().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Event search completed");

        rows.into_iter().map(EventRecord::try_from).collect()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
