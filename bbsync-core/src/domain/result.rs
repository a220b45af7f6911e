//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every layer fails fast and hands the first error upward unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// No usable certificate set exists for a connection and none could be
    /// materialized from stored metadata
    #[error("Certificates not found: {0}")]
    CertificatesNotFound(String),

    /// Socket/connection level failure (including deadline expiry)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx response from the bank
    #[error("HTTP {status_code} {status_message}")]
    HttpStatus {
        status_code: u16,
        status_message: String,
    },

    /// A 2xx response whose body is not the JSON we expect
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The wallet/connection does not hold enough credential data
    #[error("Insufficient credentials: {0}")]
    CredentialsInsufficient(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn certificates_not_found(msg: impl Into<String>) -> Self {
        Self::CertificatesNotFound(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::CredentialsInsufficient(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// HTTP status code for `HttpStatus` errors
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Success/data/error envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}
