//! ZeroTier Central hook shapes and hook-type classification.
//!
//! Every delivery carries a `hook_type` discriminator next to the common
//! `hook_id`/`org_id` envelope. Classification reads only that discriminator;
//! the variant structs below are decoded afterwards by the mapper.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::JsonObject;

/// Event-type tag of a hook payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HookType {
    /// A member joined a network (`NETWORK_JOIN`)
    NetworkJoin,
    /// A network was created (`NETWORK_CREATED`)
    NetworkCreated,
    /// A network's configuration changed (`NETWORK_CONFIG_CHANGED`)
    NetworkConfigChanged,
    /// Any tag this service does not handle, kept verbatim
    Unrecognized(String),
}

impl HookType {
    pub const NETWORK_JOIN: &'static str = "NETWORK_JOIN";
    pub const NETWORK_CREATED: &'static str = "NETWORK_CREATED";
    pub const NETWORK_CONFIG_CHANGED: &'static str = "NETWORK_CONFIG_CHANGED";

    /// Maps a wire tag to a hook type. Total: unknown tags become `Unrecognized`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            Self::NETWORK_JOIN => HookType::NetworkJoin,
            Self::NETWORK_CREATED => HookType::NetworkCreated,
            Self::NETWORK_CONFIG_CHANGED => HookType::NetworkConfigChanged,
            other => HookType::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HookType::NetworkJoin => Self::NETWORK_JOIN,
            HookType::NetworkCreated => Self::NETWORK_CREATED,
            HookType::NetworkConfigChanged => Self::NETWORK_CONFIG_CHANGED,
            HookType::Unrecognized(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, HookType::Unrecognized(_))
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for HookType {
    fn from(tag: String) -> Self {
        HookType::from_tag(&tag)
    }
}

impl From<HookType> for String {
    fn from(hook_type: HookType) -> Self {
        match hook_type {
            HookType::Unrecognized(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// Envelope shared by every hook variant; returned to the sender as acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookBase {
    pub hook_id: String,
    pub org_id: String,
    pub hook_type: HookType,
}

/// `NETWORK_JOIN`: a new member asked to join a network.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkJoin {
    #[serde(flatten)]
    pub base: HookBase,
    pub network_id: String,
    pub member_id: String,
}

/// `NETWORK_CREATED`: a user created a network.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkCreated {
    #[serde(flatten)]
    pub base: HookBase,
    pub network_id: String,
    #[serde(default)]
    pub network_config: Option<JsonObject>,
    #[serde(default)]
    pub network_metadata: Option<JsonObject>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

/// `NETWORK_CONFIG_CHANGED`: a user changed a network's configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfigChanged {
    #[serde(flatten)]
    pub base: HookBase,
    pub network_id: String,
    #[serde(default)]
    pub old_config: Option<JsonObject>,
    #[serde(default)]
    pub new_config: Option<JsonObject>,
    #[serde(default)]
    pub network_metadata: Option<JsonObject>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

/// A fully decoded hook of one of the handled variants.
#[derive(Debug, Clone)]
pub enum Hook {
    NetworkJoin(NetworkJoin),
    NetworkCreated(NetworkCreated),
    NetworkConfigChanged(NetworkConfigChanged),
}

impl Hook {
    pub fn base(&self) -> &HookBase {
        match self {
            Hook::NetworkJoin(hook) => &hook.base,
            Hook::NetworkCreated(hook) => &hook.base,
            Hook::NetworkConfigChanged(hook) => &hook.base,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("malformed hook envelope: {0}")]
    MalformedEnvelope(String),

    #[error("malformed hook envelope: hook_type is missing")]
    MissingHookType,
}

/// Reads the `hook_type` discriminator of a raw payload.
///
/// The payload must be a JSON object. Unknown tags are not an error here;
/// they come back as [`HookType::Unrecognized`] and are rejected by the mapper.
pub fn classify(payload: &[u8]) -> Result<HookType, ClassificationError> {
    let envelope: JsonObject = serde_json::from_slice(payload)
        .map_err(|e| ClassificationError::MalformedEnvelope(e.to_string()))?;

    match envelope.get("hook_type") {
        None | Some(Value::Null) => Err(ClassificationError::MissingHookType),
        Some(Value::String(tag)) => Ok(HookType::from_tag(tag)),
        Some(other) => Err(ClassificationError::MalformedEnvelope(format!(
            "hook_type must be a string, got {other}"
        ))),
    }
}
