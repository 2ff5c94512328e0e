//! ZeroTier Central webhook signature verification.
//!
//! Central signs each delivery with HMAC-SHA256 keyed by the hex-decoded
//! pre-shared key. The `X-ZTC-Signature` header looks like
//! `t=<unix seconds>,v1=<hex digest>` and the signed message is
//! `"<t>," || body`. Several `v1` entries may be present while a key is
//! being rotated; any one of them matching is enough.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature on inbound deliveries
pub const SIGNATURE_HEADER: &str = "X-ZTC-Signature";

/// Maximum allowed skew between the signed timestamp and verification time
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("malformed signature header: {0}")]
    MalformedHeader(String),

    #[error("pre-shared key is not valid hex")]
    InvalidSecret,

    #[error("signature timestamp {timestamp} is outside the {tolerance_secs}s tolerance window")]
    OutsideTolerance { timestamp: i64, tolerance_secs: u64 },

    #[error("no signature matches the payload")]
    Mismatch,
}

/// Signature material for exactly one verification attempt.
///
/// Built per request and consumed by [`SignatureContext::verify`]. When
/// either the signature or the secret is missing, verification is skipped.
#[derive(Default)]
pub struct SignatureContext {
    signature: Option<String>,
    secret: Option<String>,
}

impl SignatureContext {
    /// Empty strings are treated the same as absent values.
    pub fn new(signature: Option<String>, secret: Option<String>) -> Self {
        Self {
            signature: signature.filter(|s| !s.is_empty()),
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Context that always skips verification
    pub fn unsigned() -> Self {
        Self::default()
    }

    pub fn is_bypassed(&self) -> bool {
        self.signature.is_none() || self.secret.is_none()
    }

    pub fn verify(
        self,
        payload: &[u8],
        now: DateTime<Utc>,
        tolerance: Duration,
    ) -> Result<(), VerificationError> {
        match (self.signature, self.secret) {
            (Some(signature), Some(secret)) => {
                verify_signature(payload, &signature, &secret, now, tolerance)
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for SignatureContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureContext")
            .field("signature", &self.signature)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Parsed form of the `X-ZTC-Signature` header.
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_signature_header(header: &str) -> Result<SignatureHeader, VerificationError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let part = part.trim();
        let Some((key, value)) = part.split_once('=') else {
            return Err(VerificationError::MalformedHeader(format!(
                "expected key=value, got '{part}'"
            )));
        };

        match key {
            "t" => {
                let parsed = value.parse::<i64>().map_err(|_| {
                    VerificationError::MalformedHeader(format!("invalid timestamp '{value}'"))
                })?;
                timestamp = Some(parsed);
            }
            "v1" => {
                let decoded = hex::decode(value).map_err(|_| {
                    VerificationError::MalformedHeader("v1 signature is not valid hex".to_string())
                })?;
                signatures.push(decoded);
            }
            // Other schemes may be added by the sender; they are not ours to check
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| VerificationError::MalformedHeader("missing timestamp".to_string()))?;

    if signatures.is_empty() {
        return Err(VerificationError::MalformedHeader(
            "missing v1 signature".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn decode_secret(secret: &str) -> Result<Vec<u8>, VerificationError> {
    hex::decode(secret.trim()).map_err(|_| VerificationError::InvalidSecret)
}

fn signing_mac(key: &[u8], timestamp: i64, payload: &[u8]) -> Result<HmacSha256, VerificationError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| VerificationError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b",");
    mac.update(payload);
    Ok(mac)
}

/// Computes the raw HMAC-SHA256 signature for a payload signed at `timestamp`.
pub fn compute_signature(
    payload: &[u8],
    secret: &str,
    timestamp: i64,
) -> Result<Vec<u8>, VerificationError> {
    let key = decode_secret(secret)?;
    Ok(signing_mac(&key, timestamp, payload)?
        .finalize()
        .into_bytes()
        .to_vec())
}

/// Produces an `X-ZTC-Signature` header value for a payload.
pub fn sign_payload(
    payload: &[u8],
    secret: &str,
    timestamp: i64,
) -> Result<String, VerificationError> {
    let signature = compute_signature(payload, secret, timestamp)?;
    Ok(format!("t={timestamp},v1={}", hex::encode(signature)))
}

/// Verifies a signature header against the payload and pre-shared key.
///
/// Fails when the signed timestamp is more than `tolerance` away from
/// `now` in either direction, or when no `v1` entry matches. Digest
/// comparison is constant time.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Result<(), VerificationError> {
    let header = parse_signature_header(header)?;
    let key = decode_secret(secret)?;

    if now.timestamp().abs_diff(header.timestamp) > tolerance.as_secs() {
        return Err(VerificationError::OutsideTolerance {
            timestamp: header.timestamp,
            tolerance_secs: tolerance.as_secs(),
        });
    }

    let mac = signing_mac(&key, header.timestamp, payload)?;
    let matched = header
        .signatures
        .iter()
        .any(|candidate| mac.clone().verify_slice(candidate).is_ok());

    if matched {
        Ok(())
    } else {
        Err(VerificationError::Mismatch)
    }
}
