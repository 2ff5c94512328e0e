use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::HookType;

/// Structured JSON blob carried by a hook (network config, metadata, ...)
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Normalized, storage-ready projection of a decoded hook.
///
/// Only the fields relevant to the source hook type are populated. The
/// `id` is assigned by storage and is `None` until the record was inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub hook_id: String,
    pub org_id: String,
    pub hook_type: HookType,
    pub network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_config: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_config: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_config: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonObject>,
    pub created_at: DateTime<Utc>,
}

/// A single exact-match filter on a stored event column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    NetworkId(String),
    MemberId(String),
    UserId(String),
}

impl Predicate {
    /// Column the predicate compares against
    pub fn column(&self) -> &'static str {
        match self {
            Predicate::NetworkId(_) => "network_id",
            Predicate::MemberId(_) => "member_id",
            Predicate::UserId(_) => "user_id",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Predicate::NetworkId(v) | Predicate::MemberId(v) | Predicate::UserId(v) => v,
        }
    }

    pub fn matches(&self, record: &EventRecord) -> bool {
        match self {
            Predicate::NetworkId(v) => record.network_id == *v,
            Predicate::MemberId(v) => record.member_id.as_deref() == Some(v.as_str()),
            Predicate::UserId(v) => record.user_id.as_deref() == Some(v.as_str()),
        }
    }
}

/// Search filter: every predicate must hold (logical AND).
///
/// An empty criteria matches all stored events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    predicates: Vec<Predicate>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network_id(self, network_id: impl Into<String>) -> Self {
        self.with(Predicate::NetworkId(network_id.into()))
    }

    pub fn with_member_id(self, member_id: impl Into<String>) -> Self {
        self.with(Predicate::MemberId(member_id.into()))
    }

    pub fn with_user_id(self, user_id: impl Into<String>) -> Self {
        self.with(Predicate::UserId(user_id.into()))
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, record: &EventRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}
