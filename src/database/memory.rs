use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repository::{EventStore, StoreError};
use crate::models::{EventRecord, SearchCriteria};

/// In-process event store, used by tests and for throwaway runs
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    events: Arc<RwLock<Vec<EventRecord>>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Copy of everything stored so far, in insertion order
    pub async fn snapshot(&self) -> Vec<EventRecord> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, mut record: EventRecord) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        record.id = Some(events.len() as i64 + 1);
        events.push(record);
        Ok(())
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<EventRecord>, StoreError> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect())
    }
}
