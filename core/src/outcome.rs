//! Result codes and the per-call `Outcome` envelope.
//!
//! # Design
//! Every resource call resolves to exactly one `ResultCode`. The `Outcome`
//! carries that code plus at most one payload: validation errors, a
//! request error code, a created id, a single element or an element list.
//! Fields are private and the constructors are the only way in, so a
//! populated `Outcome` never mixes payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StorageError;

/// Closed set of outcomes a storage call can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    // Permission and availability.
    Unauthorized,
    Forbidden,
    Unsupported,
    DoesNotExist,
    // Edition.
    AlreadyExists,
    ValidationError,
    DuplicateKey,
    InUse,
    Conflict,
    FormatError,
    BadRequest,
    // Other client-side errors.
    ClientError,
    // Connectivity and server errors.
    Unreachable,
    ServiceUnavailable,
    Timeout,
    ServerError,
    InternalError,
    // Success.
    Created,
    Updated,
    Replaced,
    Deleted,
    Ok,
}

/// Coarse grouping of `ResultCode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCategory {
    Permission,
    Edit,
    MalformedExchange,
    Connectivity,
    Success,
}

impl ResultCode {
    pub const ALL: [ResultCode; 22] = [
        ResultCode::Unauthorized,
        ResultCode::Forbidden,
        ResultCode::Unsupported,
        ResultCode::DoesNotExist,
        ResultCode::AlreadyExists,
        ResultCode::ValidationError,
        ResultCode::DuplicateKey,
        ResultCode::InUse,
        ResultCode::Conflict,
        ResultCode::FormatError,
        ResultCode::BadRequest,
        ResultCode::ClientError,
        ResultCode::Unreachable,
        ResultCode::ServiceUnavailable,
        ResultCode::Timeout,
        ResultCode::ServerError,
        ResultCode::InternalError,
        ResultCode::Created,
        ResultCode::Updated,
        ResultCode::Replaced,
        ResultCode::Deleted,
        ResultCode::Ok,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResultCode::Unauthorized => "Unauthorized",
            ResultCode::Forbidden => "Forbidden",
            ResultCode::Unsupported => "Unsupported",
            ResultCode::DoesNotExist => "DoesNotExist",
            ResultCode::AlreadyExists => "AlreadyExists",
            ResultCode::ValidationError => "ValidationError",
            ResultCode::DuplicateKey => "DuplicateKey",
            ResultCode::InUse => "InUse",
            ResultCode::Conflict => "Conflict",
            ResultCode::FormatError => "FormatError",
            ResultCode::BadRequest => "BadRequest",
            ResultCode::ClientError => "ClientError",
            ResultCode::Unreachable => "Unreachable",
            ResultCode::ServiceUnavailable => "ServiceUnavailable",
            ResultCode::Timeout => "Timeout",
            ResultCode::ServerError => "ServerError",
            ResultCode::InternalError => "InternalError",
            ResultCode::Created => "Created",
            ResultCode::Updated => "Updated",
            ResultCode::Replaced => "Replaced",
            ResultCode::Deleted => "Deleted",
            ResultCode::Ok => "Ok",
        }
    }

    pub fn category(self) -> ResultCategory {
        match self {
            ResultCode::Unauthorized
            | ResultCode::Forbidden
            | ResultCode::Unsupported
            | ResultCode::DoesNotExist => ResultCategory::Permission,
            ResultCode::AlreadyExists
            | ResultCode::ValidationError
            | ResultCode::DuplicateKey
            | ResultCode::InUse
            | ResultCode::Conflict => ResultCategory::Edit,
            ResultCode::FormatError | ResultCode::BadRequest | ResultCode::ClientError => {
                ResultCategory::MalformedExchange
            }
            ResultCode::Unreachable
            | ResultCode::ServiceUnavailable
            | ResultCode::Timeout
            | ResultCode::ServerError
            | ResultCode::InternalError => ResultCategory::Connectivity,
            ResultCode::Created
            | ResultCode::Updated
            | ResultCode::Replaced
            | ResultCode::Deleted
            | ResultCode::Ok => ResultCategory::Success,
        }
    }

    pub fn is_success(self) -> bool {
        self.category() == ResultCategory::Success
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single storage call.
///
/// `E` is the element type and `Id` the type of created ids. Callers branch
/// on `code()` and then read the payload that code implies.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<E, Id = String> {
    code: ResultCode,
    validation_errors: Option<Map<String, Value>>,
    request_error_code: Option<String>,
    created_id: Option<Id>,
    element: Option<E>,
    elements: Option<Vec<E>>,
}

impl<E, Id> Outcome<E, Id> {
    fn bare(code: ResultCode) -> Self {
        Self {
            code,
            validation_errors: None,
            request_error_code: None,
            created_id: None,
            element: None,
            elements: None,
        }
    }

    /// Success with no payload (update, replace, delete).
    pub fn ok() -> Self {
        Self::bare(ResultCode::Ok)
    }

    /// Success carrying one element (read, named calls).
    pub fn with_element(element: E) -> Self {
        Self {
            element: Some(element),
            ..Self::bare(ResultCode::Ok)
        }
    }

    /// Success carrying several elements (list pages and array-shaped calls).
    pub fn with_elements(elements: Vec<E>) -> Self {
        Self {
            elements: Some(elements),
            ..Self::bare(ResultCode::Ok)
        }
    }

    /// Creation success carrying the id reported by the server.
    pub fn created(id: Id) -> Self {
        Self {
            created_id: Some(id),
            ..Self::bare(ResultCode::Created)
        }
    }

    /// Failure outcome built from a classified error. No element payload.
    pub fn from_error(error: StorageError) -> Self {
        Self {
            validation_errors: error.validation_errors,
            request_error_code: error.request_error_code,
            ..Self::bare(error.code)
        }
    }

    /// Folds a fallible call into an `Outcome`.
    ///
    /// This is where classified failures stop propagating: callers of the
    /// resource facade only ever see an `Outcome`.
    pub fn capture(result: Result<Self, StorageError>) -> Self {
        result.unwrap_or_else(Self::from_error)
    }

    pub fn code(&self) -> ResultCode {
        self.code
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    pub fn validation_errors(&self) -> Option<&Map<String, Value>> {
        self.validation_errors.as_ref()
    }

    pub fn request_error_code(&self) -> Option<&str> {
        self.request_error_code.as_deref()
    }

    pub fn created_id(&self) -> Option<&Id> {
        self.created_id.as_ref()
    }

    pub fn element(&self) -> Option<&E> {
        self.element.as_ref()
    }

    pub fn elements(&self) -> Option<&[E]> {
        self.elements.as_deref()
    }

    pub fn into_element(self) -> Option<E> {
        self.element
    }

    pub fn into_elements(self) -> Option<Vec<E>> {
        self.elements
    }

    pub fn into_created_id(self) -> Option<Id> {
        self.created_id
    }
}
