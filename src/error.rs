use axum::{
    Json,
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::database::StoreError;
use crate::events::ProcessingError;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error codes for categorizing errors in logs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "SIG_1001")]
    InvalidSignature,
    #[serde(rename = "ENV_2001")]
    MalformedEnvelope,
    #[serde(rename = "HOOK_3001")]
    UnsupportedHookType,
    #[serde(rename = "DEC_3002")]
    DecodeFailed,
    #[serde(rename = "REQ_4001")]
    InvalidRequest,
    #[serde(rename = "DB_7001")]
    StorageFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidSignature => "SIG_1001",
            ErrorCode::MalformedEnvelope => "ENV_2001",
            ErrorCode::UnsupportedHookType => "HOOK_3001",
            ErrorCode::DecodeFailed => "DEC_3002",
            ErrorCode::InvalidRequest => "REQ_4001",
            ErrorCode::StorageFailed => "DB_7001",
        }
    }
}

/// Error body returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request body or query string could not be extracted
    #[error("error reading request: {0}")]
    InvalidRequest(String),
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl ApiError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::Processing(e) => e.code(),
            ApiError::Store(_) => ErrorCode::StorageFailed,
            ApiError::InvalidRequest(_) => ErrorCode::InvalidRequest,
        }
    }

    fn is_client_error(&self) -> bool {
        match self {
            ApiError::Processing(e) => e.is_client_error(),
            ApiError::InvalidRequest(_) => true,
            ApiError::Store(_) => false,
        }
    }

    /// Every failure is reported as 500, including sender faults.
    /// Webhook senders retry on any non-2xx, so the distinction only
    /// matters in logs.
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Log error with appropriate level. The request id comes from the
    /// request logger span.
    fn log_error(&self) {
        let code = self.error_code().as_str();
        if self.is_client_error() {
            warn!(code, error = %self, "Client error occurred");
        } else {
            error!(code, error = %self, "Server error occurred");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_error();

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}
