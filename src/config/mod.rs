use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::events::DEFAULT_TOLERANCE;

/// Largest accepted webhook body, 2 MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// How inbound signatures are handled
#[derive(Clone, PartialEq, Eq)]
pub enum SignatureMode {
    /// Deliveries carrying a signature are verified against this hex key
    Enforced { secret: String },
    /// No pre-shared key configured; every delivery is accepted unverified
    Bypass,
}

impl SignatureMode {
    pub fn secret(&self) -> Option<&str> {
        match self {
            SignatureMode::Enforced { secret } => Some(secret),
            SignatureMode::Bypass => None,
        }
    }

    pub fn is_bypass(&self) -> bool {
        matches!(self, SignatureMode::Bypass)
    }
}

impl fmt::Debug for SignatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureMode::Enforced { .. } => f.write_str("Enforced { secret: <redacted> }"),
            SignatureMode::Bypass => f.write_str("Bypass"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub db_file_location: String,
    pub signature_mode: SignatureMode,
    pub signature_tolerance: Duration,
    pub max_connections: u32,
    pub request_timeout: u64,
    pub max_body_bytes: usize,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let signature_mode = match lookup("PRE_SHARED_KEY").filter(|key| !key.is_empty()) {
            Some(secret) => {
                hex::decode(&secret)
                    .context("PRE_SHARED_KEY must be a hex encoded key")?;
                SignatureMode::Enforced { secret }
            }
            None => SignatureMode::Bypass,
        };

        Ok(Config {
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            db_file_location: lookup("DB_FILE_LOCATION")
                .filter(|location| !location.is_empty())
                .ok_or_else(|| {
                    anyhow::anyhow!("DB_FILE_LOCATION environment variable is required")
                })?,
            signature_mode,
            signature_tolerance: Duration::from_secs(parse_or(
                &lookup,
                "SIGNATURE_TOLERANCE_SECS",
                DEFAULT_TOLERANCE.as_secs(),
            )?),
            max_connections: parse_or(&lookup, "MAX_CONNECTIONS", 5)?,
            request_timeout: parse_or(&lookup, "REQUEST_TIMEOUT", 30)?,
            max_body_bytes: parse_or(&lookup, "MAX_BODY_SIZE", DEFAULT_MAX_BODY_BYTES)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .with_context(|| format!("{key} has an invalid value '{value}'")),
        None => Ok(default),
    }
}
