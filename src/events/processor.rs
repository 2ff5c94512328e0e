//! Ingestion pipeline: verify, classify, decode, persist.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::hook::{ClassificationError, HookBase, HookType, classify};
use super::mapper::{DecodeError, decode_and_map};
use super::signature::{DEFAULT_TOLERANCE, SignatureContext, VerificationError};
use crate::database::{EventStore, StoreError};
use crate::error::ErrorCode;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("signature verification failed: {0}")]
    SignatureInvalid(#[from] VerificationError),

    #[error("error when fetching the hook type: {0}")]
    MalformedEnvelope(#[from] ClassificationError),

    #[error("unhandled event type: {0}")]
    UnsupportedHookType(String),

    #[error("error decoding {variant} event: {cause}")]
    Decode { variant: HookType, cause: String },

    #[error("error inserting event into database: {0}")]
    Storage(#[from] StoreError),
}

impl ProcessingError {
    /// Stable code for logs
    pub fn code(&self) -> ErrorCode {
        match self {
            ProcessingError::SignatureInvalid(_) => ErrorCode::InvalidSignature,
            ProcessingError::MalformedEnvelope(_) => ErrorCode::MalformedEnvelope,
            ProcessingError::UnsupportedHookType(_) => ErrorCode::UnsupportedHookType,
            ProcessingError::Decode { .. } => ErrorCode::DecodeFailed,
            ProcessingError::Storage(_) => ErrorCode::StorageFailed,
        }
    }

    /// Whether the sender is at fault, as opposed to this service
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ProcessingError::Storage(_))
    }
}

impl From<DecodeError> for ProcessingError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnsupportedHookType(tag) => ProcessingError::UnsupportedHookType(tag),
            DecodeError::Malformed { variant, cause } => ProcessingError::Decode { variant, cause },
        }
    }
}

/// Turns raw webhook deliveries into stored events.
///
/// Holds no per-request state; signature material travels with each call,
/// so one processor is shared by every request.
pub struct EventProcessor {
    store: Arc<dyn EventStore>,
    tolerance: Duration,
}

impl EventProcessor {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self::with_tolerance(store, DEFAULT_TOLERANCE)
    }

    pub fn with_tolerance(store: Arc<dyn EventStore>, tolerance: Duration) -> Self {
        Self { store, tolerance }
    }

    /// Processes one delivery. On success exactly one record has been
    /// inserted; on any error nothing has.
    ///
    /// Rejections are returned, not logged; the caller reports them once.
    #[instrument(skip_all, fields(payload_len = payload.len(), bypass = signature.is_bypassed()))]
    pub async fn process(
        &self,
        payload: &[u8],
        signature: SignatureContext,
    ) -> Result<HookBase, ProcessingError> {
        let now = Utc::now();

        if signature.is_bypassed() {
            debug!("Signature verification skipped");
        }
        signature.verify(payload, now, self.tolerance)?;
        debug!("Signature verified");

        let hook_type = classify(payload)?;
        debug!(hook_type = %hook_type, "Hook classified");

        let (base, record) = decode_and_map(payload, &hook_type, now)?;
        debug!(hook_id = %base.hook_id, network_id = %record.network_id, "Hook decoded");

        self.store.insert(record).await?;
        info!(
            hook_id = %base.hook_id,
            org_id = %base.org_id,
            hook_type = %base.hook_type,
            "Event accepted"
        );

        Ok(base)
    }
}
