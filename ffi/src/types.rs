//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Element payloads stay JSON text so
//! the host deserializes them into its own types. Conversions live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use remote_storage_core::{Endpoint, HttpMethod, HttpRequest, Outcome, ResultCode};
use serde_json::Value;

/// Opaque handle holding the base endpoint and its credentials. C callers
/// receive a pointer to this and pass it back into every `rs_build_*`.
pub struct FfiStorage {
    pub(crate) endpoint: Endpoint,
}

/// Move `s` into a heap C string. Null if `s` has an interior NUL.
pub(crate) fn into_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s)
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

/// Reclaim a string made by `into_c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A request the host must execute with its own HTTP stack.
///
/// `body` is null when no body is sent; otherwise it is a JSON C string
/// and the `content-type` header is already among `headers`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(key, value)| FfiHeader {
                    key: into_c_string(key),
                    value: into_c_string(value),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: into_c_string(req.url),
            headers,
            headers_len,
            body: req.body.map_or(std::ptr::null_mut(), into_c_string),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A response the host received. The FFI layer reads but never frees
/// these fields. `body` may be null when `body_len` is zero.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: usize,
}

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// `ResultCode` for C, plus the two failures only the boundary can produce.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResultCode {
    Unauthorized = 0,
    Forbidden = 1,
    Unsupported = 2,
    DoesNotExist = 3,
    AlreadyExists = 4,
    ValidationError = 5,
    DuplicateKey = 6,
    InUse = 7,
    Conflict = 8,
    FormatError = 9,
    BadRequest = 10,
    ClientError = 11,
    Unreachable = 12,
    ServiceUnavailable = 13,
    Timeout = 14,
    ServerError = 15,
    InternalError = 16,
    Created = 17,
    Updated = 18,
    Replaced = 19,
    Deleted = 20,
    Ok = 21,
    NullArg = 100,
    Panic = 101,
}

impl From<ResultCode> for FfiResultCode {
    fn from(code: ResultCode) -> Self {
        match code {
            ResultCode::Unauthorized => FfiResultCode::Unauthorized,
            ResultCode::Forbidden => FfiResultCode::Forbidden,
            ResultCode::Unsupported => FfiResultCode::Unsupported,
            ResultCode::DoesNotExist => FfiResultCode::DoesNotExist,
            ResultCode::AlreadyExists => FfiResultCode::AlreadyExists,
            ResultCode::ValidationError => FfiResultCode::ValidationError,
            ResultCode::DuplicateKey => FfiResultCode::DuplicateKey,
            ResultCode::InUse => FfiResultCode::InUse,
            ResultCode::Conflict => FfiResultCode::Conflict,
            ResultCode::FormatError => FfiResultCode::FormatError,
            ResultCode::BadRequest => FfiResultCode::BadRequest,
            ResultCode::ClientError => FfiResultCode::ClientError,
            ResultCode::Unreachable => FfiResultCode::Unreachable,
            ResultCode::ServiceUnavailable => FfiResultCode::ServiceUnavailable,
            ResultCode::Timeout => FfiResultCode::Timeout,
            ResultCode::ServerError => FfiResultCode::ServerError,
            ResultCode::InternalError => FfiResultCode::InternalError,
            ResultCode::Created => FfiResultCode::Created,
            ResultCode::Updated => FfiResultCode::Updated,
            ResultCode::Replaced => FfiResultCode::Replaced,
            ResultCode::Deleted => FfiResultCode::Deleted,
            ResultCode::Ok => FfiResultCode::Ok,
        }
    }
}

/// Tells the host what `FfiOutcome::payload` holds.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiPayloadTag {
    None = 0,
    /// One JSON document.
    Element = 1,
    /// A JSON array of documents.
    Elements = 2,
    /// The created id, as plain text.
    CreatedId = 3,
}

/// Outcome envelope for every `rs_parse_*` call.
///
/// `validation_errors` (JSON object) and `request_error_code` are only set
/// on `ValidationError` and `BadRequest` respectively. `payload` is null
/// on every failure.
#[repr(C)]
pub struct FfiOutcome {
    pub code: FfiResultCode,
    pub request_error_code: *mut c_char,
    pub validation_errors: *mut c_char,
    pub payload_tag: FfiPayloadTag,
    pub payload: *mut c_char,
}

impl FfiOutcome {
    fn bare(code: FfiResultCode) -> Self {
        FfiOutcome {
            code,
            request_error_code: std::ptr::null_mut(),
            validation_errors: std::ptr::null_mut(),
            payload_tag: FfiPayloadTag::None,
            payload: std::ptr::null_mut(),
        }
    }

    pub(crate) fn from_core(outcome: Outcome<Value>) -> *mut Self {
        let mut ffi = FfiOutcome::bare(outcome.code().into());
        if let Some(code) = outcome.request_error_code() {
            ffi.request_error_code = into_c_string(code);
        }
        if let Some(errors) = outcome.validation_errors() {
            ffi.validation_errors = into_c_string(Value::Object(errors.clone()).to_string());
        }
        let (tag, payload) = if let Some(id) = outcome.created_id() {
            (FfiPayloadTag::CreatedId, id.clone())
        } else if let Some(element) = outcome.element() {
            (FfiPayloadTag::Element, element.to_string())
        } else if let Some(elements) = outcome.elements() {
            (FfiPayloadTag::Elements, Value::from(elements.to_vec()).to_string())
        } else {
            (FfiPayloadTag::None, String::new())
        };
        if tag != FfiPayloadTag::None {
            ffi.payload_tag = tag;
            ffi.payload = into_c_string(payload);
        }
        Box::into_raw(Box::new(ffi))
    }

    pub(crate) fn null_arg() -> *mut Self {
        Box::into_raw(Box::new(FfiOutcome::bare(FfiResultCode::NullArg)))
    }

    pub(crate) fn panic() -> *mut Self {
        Box::into_raw(Box::new(FfiOutcome::bare(FfiResultCode::Panic)))
    }
}
