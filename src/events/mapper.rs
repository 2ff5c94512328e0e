//! Decoding of classified hooks and their projection into [`EventRecord`]s.

use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::hook::{Hook, HookBase, HookType, NetworkConfigChanged, NetworkCreated, NetworkJoin};
use crate::models::EventRecord;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unhandled event type: {0}")]
    UnsupportedHookType(String),

    #[error("error decoding {variant} event: {cause}")]
    Malformed { variant: HookType, cause: String },
}

/// Decodes `payload` as the variant named by `hook_type` and maps it to a record.
///
/// `now` becomes the record's `created_at`, truncated to whole seconds, so a
/// retried insert of the same record keeps its logical event time.
pub fn decode_and_map(
    payload: &[u8],
    hook_type: &HookType,
    now: DateTime<Utc>,
) -> Result<(HookBase, EventRecord), DecodeError> {
    let hook = decode(payload, hook_type)?;
    let base = hook.base().clone();
    let record = into_record(hook, now.trunc_subsecs(0));

    Ok((base, record))
}

/// Fully decodes a payload into the variant selected by `hook_type`.
pub fn decode(payload: &[u8], hook_type: &HookType) -> Result<Hook, DecodeError> {
    match hook_type {
        HookType::NetworkJoin => decode_variant(payload, hook_type).map(Hook::NetworkJoin),
        HookType::NetworkCreated => decode_variant(payload, hook_type).map(Hook::NetworkCreated),
        HookType::NetworkConfigChanged => {
            decode_variant(payload, hook_type).map(Hook::NetworkConfigChanged)
        }
        HookType::Unrecognized(tag) => Err(DecodeError::UnsupportedHookType(tag.clone())),
    }
}

fn decode_variant<T: DeserializeOwned>(
    payload: &[u8],
    hook_type: &HookType,
) -> Result<T, DecodeError> {
    serde_json::from_slice(payload).map_err(|e| DecodeError::Malformed {
        variant: hook_type.clone(),
        cause: e.to_string(),
    })
}

fn into_record(hook: Hook, created_at: DateTime<Utc>) -> EventRecord {
    match hook {
        Hook::NetworkJoin(hook) => from_network_join(hook, created_at),
        Hook::NetworkCreated(hook) => from_network_created(hook, created_at),
        Hook::NetworkConfigChanged(hook) => from_network_config_changed(hook, created_at),
    }
}

fn from_network_join(hook: NetworkJoin, created_at: DateTime<Utc>) -> EventRecord {
    EventRecord {
        id: None,
        hook_id: hook.base.hook_id,
        org_id: hook.base.org_id,
        hook_type: hook.base.hook_type,
        network_id: hook.network_id,
        member_id: non_empty(Some(hook.member_id)),
        user_id: None,
        user_email: None,
        network_config: None,
        old_config: None,
        new_config: None,
        metadata: None,
        created_at,
    }
}

fn from_network_created(hook: NetworkCreated, created_at: DateTime<Utc>) -> EventRecord {
    EventRecord {
        id: None,
        hook_id: hook.base.hook_id,
        org_id: hook.base.org_id,
        hook_type: hook.base.hook_type,
        network_id: hook.network_id,
        member_id: None,
        user_id: non_empty(hook.user_id),
        user_email: non_empty(hook.user_email),
        network_config: hook.network_config,
        old_config: None,
        new_config: None,
        metadata: hook.network_metadata,
        created_at,
    }
}

fn from_network_config_changed(
    hook: NetworkConfigChanged,
    created_at: DateTime<Utc>,
) -> EventRecord {
    EventRecord {
        id: None,
        hook_id: hook.base.hook_id,
        org_id: hook.base.org_id,
        hook_type: hook.base.hook_type,
        network_id: hook.network_id,
        member_id: None,
        user_id: non_empty(hook.user_id),
        user_email: non_empty(hook.user_email),
        network_config: None,
        old_config: hook.old_config,
        new_config: hook.new_config,
        metadata: hook.network_metadata,
        created_at,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
