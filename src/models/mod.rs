// Data models shared by the ingestion pipeline and storage

pub mod event;

pub use event::{EventRecord, JsonObject, Predicate, SearchCriteria};
