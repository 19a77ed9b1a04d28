//! JSON encoding of request bodies and decoding of response bodies.
//!
//! Decoding failures surface as `FormatError` unless the caller asks for a
//! different code, which the classifier does when a malformed body should
//! degrade to a generic outcome instead.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StorageError;
use crate::outcome::ResultCode;

/// Serialize `value` to JSON bytes. An absent value encodes to an empty
/// byte sequence, and callers skip attaching a body in that case.
pub fn encode<T: Serialize + ?Sized>(value: Option<&T>) -> Result<Vec<u8>, StorageError> {
    match value {
        None => Ok(Vec::new()),
        Some(value) => {
            serde_json::to_vec(value).map_err(|_| StorageError::new(ResultCode::FormatError))
        }
    }
}

pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, StorageError> {
    decode_or(data, ResultCode::FormatError)
}

/// Like `decode`, but a parse failure resolves to `code`.
pub fn decode_or<T: DeserializeOwned>(data: &[u8], code: ResultCode) -> Result<T, StorageError> {
    serde_json::from_slice(data).map_err(|_| StorageError::new(code))
}

/// Decode a JSON object, rejecting any other JSON shape.
pub fn decode_object(data: &[u8]) -> Result<Map<String, Value>, StorageError> {
    decode(data)
}

/// Decode a JSON array, rejecting any other JSON shape.
pub fn decode_array(data: &[u8]) -> Result<Vec<Value>, StorageError> {
    decode(data)
}
