//! Maps HTTP statuses (and, for a few statuses, their bodies) to
//! `ResultCode`s.
//!
//! # Design
//! The checks run in a fixed priority order and the first one that matches
//! wins:
//!
//! 1. access: 401, 403, 404/410, 405
//! 2. conflict: 409, body `{code}`; a malformed body degrades to `Conflict`
//! 3. bad request: 400, body `{code, errors?}`; a malformed body is a
//!    `FormatError`
//! 4. format: 406, 415
//! 5. server: 500, 502, 503, 504
//! 6. catch-all: above 500 is `ServerError`, above 400 is `ClientError`
//!
//! Anything left over is a success whose code the calling operation picks.
//! Bodies are only parsed for 400 and 409, so unrelated statuses with
//! garbage bodies never fail spuriously.

use tracing::debug;

use crate::codec;
use crate::error::{ConnectionError, StorageError};
use crate::http::HttpResponse;
use crate::outcome::ResultCode;
use crate::types::{BadRequest, Conflict, Created};

/// Resolve a completed exchange. A connection failure is `Unreachable`
/// regardless of anything else; otherwise the status is classified.
pub fn classify_exchange(
    exchange: Result<HttpResponse, ConnectionError>,
) -> Result<HttpResponse, StorageError> {
    let response = exchange?;
    classify(response.status, &response.body)?;
    Ok(response)
}

/// Classify a status code. `Ok(())` means the status is a success and the
/// body can be decoded by the caller.
pub fn classify(status: u16, body: &[u8]) -> Result<(), StorageError> {
    let verdict = fail_on_access(status)
        .and_then(|()| fail_on_conflict(status, body))
        .and_then(|()| fail_on_bad_request(status, body))
        .and_then(|()| fail_on_format_error(status))
        .and_then(|()| fail_on_server_error(status))
        .and_then(|()| fail_on_other_errors(status));
    if let Err(error) = &verdict {
        debug!(status, code = %error.code, "response classified as failure");
    }
    verdict
}

/// Extract the id from a creation response body. Any parse failure yields
/// an empty id; creation is still reported as a success.
pub fn created_id(body: &[u8]) -> String {
    codec::decode::<Created>(body)
        .map(|created| created.id)
        .unwrap_or_default()
}

fn fail_on_access(status: u16) -> Result<(), StorageError> {
    match status {
        401 => Err(ResultCode::Unauthorized.into()),
        403 => Err(ResultCode::Forbidden.into()),
        404 | 410 => Err(ResultCode::DoesNotExist.into()),
        405 => Err(ResultCode::Unsupported.into()),
        _ => Ok(()),
    }
}

fn fail_on_conflict(status: u16, body: &[u8]) -> Result<(), StorageError> {
    if status != 409 {
        return Ok(());
    }
    let conflict: Conflict = codec::decode_or(body, ResultCode::Conflict)?;
    let code = match conflict.code.as_str() {
        "already-exists" => ResultCode::AlreadyExists,
        "in-use" => ResultCode::InUse,
        "duplicate-key" => ResultCode::DuplicateKey,
        _ => ResultCode::Conflict,
    };
    Err(code.into())
}

fn fail_on_bad_request(status: u16, body: &[u8]) -> Result<(), StorageError> {
    if status != 400 {
        return Ok(());
    }
    let bad_request: BadRequest = codec::decode(body)?;
    Err(match bad_request.code.as_str() {
        "authorization:missing-header" | "authorization:bad-scheme" => {
            ResultCode::Unauthorized.into()
        }
        "schema:invalid" => {
            StorageError::with_validation_errors(ResultCode::ValidationError, bad_request.errors)
        }
        "format:unexpected" => ResultCode::FormatError.into(),
        _ => StorageError::with_request_error_code(ResultCode::BadRequest, bad_request.code),
    })
}

fn fail_on_format_error(status: u16) -> Result<(), StorageError> {
    match status {
        406 | 415 => Err(ResultCode::FormatError.into()),
        _ => Ok(()),
    }
}

fn fail_on_server_error(status: u16) -> Result<(), StorageError> {
    match status {
        500 => Err(ResultCode::InternalError.into()),
        502 => Err(ResultCode::Unreachable.into()),
        503 => Err(ResultCode::ServiceUnavailable.into()),
        504 => Err(ResultCode::Timeout.into()),
        _ => Ok(()),
    }
}

fn fail_on_other_errors(status: u16) -> Result<(), StorageError> {
    if status > 500 {
        return Err(ResultCode::ServerError.into());
    }
    if status > 400 {
        return Err(ResultCode::ClientError.into());
    }
    Ok(())
}
