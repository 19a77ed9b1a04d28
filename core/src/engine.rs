//! Stateless request builders and response parsers.
//!
//! # Design
//! Each storage operation is split into a `build_*` function that produces
//! an `HttpRequest` and a `parse_*` function that consumes an
//! `HttpResponse`. Whoever sits in between (a `Transport`, or a host
//! talking through the FFI layer) executes the round-trip, keeping this
//! module deterministic and free of I/O.
//!
//! Verb table: GET for list, read and views; POST for create and
//! operations; PATCH for update; PUT for replace; DELETE for delete.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::classify::{classify, created_id};
use crate::codec;
use crate::endpoint::{strip_query, with_query};
use crate::error::StorageError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Args, Authorization, Cursor};

const JSON: &str = "application/json";

fn request(
    method: HttpMethod,
    url: String,
    authorization: &Authorization,
    body: Vec<u8>,
) -> HttpRequest {
    let mut headers = vec![("authorization".to_string(), authorization.header_value())];
    let body = if body.is_empty() {
        None
    } else {
        headers.push(("content-type".to_string(), JSON.to_string()));
        Some(body)
    };
    HttpRequest {
        method,
        url,
        headers,
        body,
    }
}

pub fn build_list(url: &str, authorization: &Authorization, cursor: &Cursor) -> HttpRequest {
    request(
        HttpMethod::Get,
        with_query(url, &cursor.query_string()),
        authorization,
        Vec::new(),
    )
}

pub fn build_read(url: &str, authorization: &Authorization) -> HttpRequest {
    request(HttpMethod::Get, strip_query(url).to_string(), authorization, Vec::new())
}

pub fn build_create<E: Serialize + ?Sized>(
    url: &str,
    authorization: &Authorization,
    body: Option<&E>,
) -> Result<HttpRequest, StorageError> {
    Ok(request(
        HttpMethod::Post,
        strip_query(url).to_string(),
        authorization,
        codec::encode(body)?,
    ))
}

/// `patch` is a MongoDB-style update document such as
/// `{"$set": {"caption": "..."}}`.
pub fn build_update(
    url: &str,
    authorization: &Authorization,
    patch: &Value,
) -> Result<HttpRequest, StorageError> {
    Ok(request(
        HttpMethod::Patch,
        strip_query(url).to_string(),
        authorization,
        codec::encode(Some(patch))?,
    ))
}

pub fn build_replace<E: Serialize + ?Sized>(
    url: &str,
    authorization: &Authorization,
    replacement: &E,
) -> Result<HttpRequest, StorageError> {
    Ok(request(
        HttpMethod::Put,
        strip_query(url).to_string(),
        authorization,
        codec::encode(Some(replacement))?,
    ))
}

pub fn build_delete(url: &str, authorization: &Authorization) -> HttpRequest {
    request(HttpMethod::Delete, strip_query(url).to_string(), authorization, Vec::new())
}

/// `url` must already point at the `~method` segment.
pub fn build_view(url: &str, authorization: &Authorization, args: &Args) -> HttpRequest {
    request(
        HttpMethod::Get,
        with_query(url, &args.query_string()),
        authorization,
        Vec::new(),
    )
}

/// `url` must already point at the `~method` segment.
pub fn build_operation<B: Serialize + ?Sized>(
    url: &str,
    authorization: &Authorization,
    args: &Args,
    body: Option<&B>,
) -> Result<HttpRequest, StorageError> {
    Ok(request(
        HttpMethod::Post,
        with_query(url, &args.query_string()),
        authorization,
        codec::encode(body)?,
    ))
}

pub fn parse_list<E: DeserializeOwned>(response: &HttpResponse) -> Result<Vec<E>, StorageError> {
    classify(response.status, &response.body)?;
    codec::decode(&response.body)
}

pub fn parse_read<E: DeserializeOwned>(response: &HttpResponse) -> Result<E, StorageError> {
    classify(response.status, &response.body)?;
    codec::decode(&response.body)
}

/// Returns the created id, or an empty string when the body does not
/// carry one.
pub fn parse_create(response: &HttpResponse) -> Result<String, StorageError> {
    classify(response.status, &response.body)?;
    Ok(created_id(&response.body))
}

/// For update, replace and delete: the body is never read on success.
pub fn parse_empty(response: &HttpResponse) -> Result<(), StorageError> {
    classify(response.status, &response.body)
}

/// For views and operations.
pub fn parse_call<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, StorageError> {
    classify(response.status, &response.body)?;
    codec::decode(&response.body)
}

/// For named calls that must answer with a JSON object.
pub fn parse_call_object(response: &HttpResponse) -> Result<Map<String, Value>, StorageError> {
    classify(response.status, &response.body)?;
    codec::decode_object(&response.body)
}

/// For named calls that must answer with a JSON array.
pub fn parse_call_array(response: &HttpResponse) -> Result<Vec<Value>, StorageError> {
    classify(response.status, &response.body)?;
    codec::decode_array(&response.body)
}
