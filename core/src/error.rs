//! Error types for the storage client.
//!
//! # Design
//! `StorageError` is the classifier's early exit: it carries the resolved
//! `ResultCode` and, for 400 responses, either the validation document or
//! the server's custom error code. It never reaches facade callers; the
//! resource layer folds it into an `Outcome`.
//!
//! `ConnectionError` is what a `Transport` reports when no response was
//! obtained at all. It always classifies as `Unreachable`.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::outcome::ResultCode;

/// A classified storage failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("storage access failure ({code})")]
pub struct StorageError {
    pub code: ResultCode,
    pub validation_errors: Option<Map<String, Value>>,
    pub request_error_code: Option<String>,
}

impl StorageError {
    pub fn new(code: ResultCode) -> Self {
        Self {
            code,
            validation_errors: None,
            request_error_code: None,
        }
    }

    pub fn with_validation_errors(code: ResultCode, errors: Option<Map<String, Value>>) -> Self {
        Self {
            validation_errors: errors,
            ..Self::new(code)
        }
    }

    pub fn with_request_error_code(code: ResultCode, request_error_code: impl Into<String>) -> Self {
        Self {
            request_error_code: Some(request_error_code.into()),
            ..Self::new(code)
        }
    }
}

impl From<ResultCode> for StorageError {
    fn from(code: ResultCode) -> Self {
        Self::new(code)
    }
}

/// The transport produced no response (DNS, TLS, refused connection,
/// transport-level timeout).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("connection failed: {message}")]
pub struct ConnectionError {
    pub message: String,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ConnectionError> for StorageError {
    fn from(_: ConnectionError) -> Self {
        Self::new(ResultCode::Unreachable)
    }
}
