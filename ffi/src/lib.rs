//! C-ABI wrapper around `remote-storage-core`.
//!
//! # Overview
//! Lets a game-engine host drive the storage protocol with its own HTTP
//! stack: `rs_build_*` hands back the request to send, the host performs
//! the round-trip, and `rs_parse_*` turns the response into an outcome.
//! A failed round-trip is reported through `rs_connection_failed`.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Elements, bodies, arguments and validation errors cross as JSON
//!   C strings; the host maps them onto its own types.
//! - Parsing is stateless, so `rs_parse_*` take no storage handle.
//! - The C caller owns all returned pointers and must release them with
//!   the matching `rs_free_*` function.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use remote_storage_core::error::StorageError;
use remote_storage_core::{engine, Args, Authorization, Cursor, Endpoint, HttpResponse, Outcome, ResultCode};
use serde_json::Value;

use types::*;

/// Borrow a C string. Null gives `None`; invalid UTF-8 reads as empty.
fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or(""))
}

/// Parse an optional JSON argument. `Err` means the text was not JSON.
fn json_arg(ptr: *const c_char) -> Result<Option<Value>, serde_json::Error> {
    c_str(ptr).map(serde_json::from_str::<Value>).transpose()
}

/// Optional request body. A null pointer and the JSON literal `null` both
/// mean no body.
fn body_arg(ptr: *const c_char) -> Result<Option<Value>, serde_json::Error> {
    Ok(json_arg(ptr)?.filter(|body| !body.is_null()))
}

/// Query arguments from a JSON object. Non-string values are passed in
/// their JSON form; anything but an object (or null) is rejected.
fn args_arg(ptr: *const c_char) -> Option<Args> {
    match json_arg(ptr).ok()? {
        None | Some(Value::Null) => Some(Args::new()),
        Some(Value::Object(map)) => Some(Args::from_pairs(map.into_iter().map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        }))),
        Some(_) => None,
    }
}

fn target(endpoint: &Endpoint, name: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => endpoint.item(name, id),
        None => endpoint.collection(name),
    }
}

fn storage<'a>(ptr: *const FfiStorage) -> Option<&'a FfiStorage> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { &*ptr })
    }
}

fn request_or_null(req: Option<remote_storage_core::HttpRequest>) -> *mut FfiHttpRequest {
    req.map_or(std::ptr::null_mut(), FfiHttpRequest::from_core)
}

// ---------------------------------------------------------------------------
// Storage lifecycle
// ---------------------------------------------------------------------------

/// Create a storage handle for `base_endpoint`, authorizing every request
/// with `"<scheme> <token>"`.
///
/// Returns null if any argument is null. Free with `rs_storage_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rs_storage_new(
    base_endpoint: *const c_char,
    scheme: *const c_char,
    token: *const c_char,
) -> *mut FfiStorage {
    catch_unwind(|| {
        let (Some(base), Some(scheme), Some(token)) = (c_str(base_endpoint), c_str(scheme), c_str(token)) else {
            return std::ptr::null_mut();
        };
        let endpoint = Endpoint::new(base, Authorization::new(scheme, token));
        Box::into_raw(Box::new(FfiStorage { endpoint }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a handle created by `rs_storage_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rs_storage_free(storage: *mut FfiStorage) {
    if !storage.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(storage) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a list request for resource `name`.
///
/// Returns null if `storage` or `name` is null. Free the result with
/// `rs_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn rs_build_list(
    storage_ptr: *const FfiStorage,
    name: *const c_char,
    offset: u64,
    limit: u64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let req = storage(storage_ptr).zip(c_str(name)).map(|(storage, name)| {
            let endpoint = &storage.endpoint;
            engine::build_list(
                &endpoint.collection(name),
                endpoint.authorization(),
                &Cursor::new(offset, limit),
            )
        });
        request_or_null(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a read request. `id` is null for a simple resource.
#[unsafe(no_mangle)]
pub extern "C" fn rs_build_read(
    storage_ptr: *const FfiStorage,
    name: *const c_char,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let req = storage(storage_ptr).zip(c_str(name)).map(|(storage, name)| {
            let endpoint = &storage.endpoint;
            engine::build_read(&target(endpoint, name, c_str(id)), endpoint.authorization())
        });
        request_or_null(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a create request. `body_json` may be null (or the JSON `null`) to
/// send no body.
///
/// Returns null if `body_json` is not valid JSON.
#[unsafe(no_mangle)]
pub extern "C" fn rs_build_create(
    storage_ptr: *const FfiStorage,
    name: *const c_char,
    body_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let req = storage(storage_ptr).zip(c_str(name)).and_then(|(storage, name)| {
            let body = body_arg(body_json).ok()?;
            let endpoint = &storage.endpoint;
            engine::build_create(&endpoint.collection(name), endpoint.authorization(), body.as_ref()).ok()
        });
        request_or_null(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build an update request carrying a MongoDB-style update document.
/// `id` is null for a simple resource; `patch_json` is required.
#[unsafe(no_mangle)]
pub extern "C" fn rs_build_update(
    storage_ptr: *const FfiStorage,
    name: *const c_char,
    id: *const c_char,
    patch_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let req = storage(storage_ptr).zip(c_str(name)).and_then(|(storage, name)| {
            let patch = json_arg(patch_json).ok()??;
            let endpoint = &storage.endpoint;
            engine::build_update(&target(endpoint, name, c_str(id)), endpoint.authorization(), &patch).ok()
        });
        request_or_null(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a full-replace request. `id` is null for a simple resource;
/// `body_json` is required.
#[unsafe(no_mangle)]
pub extern "C" fn rs_build_replace(
    storage_ptr: *const FfiStorage,
    name: *const c_char,
    id: *const c_char,
    body_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let req = storage(storage_ptr).zip(c_str(name)).and_then(|(storage, name)| {
            let body = json_arg(body_json).ok()??;
            let endpoint = &storage.endpoint;
            engine::build_replace(&target(endpoint, name, c_str(id)), endpoint.authorization(), &body).ok()
        });
        request_or_null(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a delete request. `id` is null for a simple resource.
#[unsafe(no_mangle)]
pub extern "C" fn rs_build_delete(
    storage_ptr: *const FfiStorage,
    name: *const c_char,
    id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let req = storage(storage_ptr).zip(c_str(name)).map(|(storage, name)| {
            let endpoint = &storage.endpoint;
            engine::build_delete(&target(endpoint, name, c_str(id)), endpoint.authorization())
        });
        request_or_null(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a named view (`GET .../~method`). `id` is null to address the
/// resource itself; `args_json` is a JSON object or null.
#[unsafe(no_mangle)]
pub extern "C" fn rs_build_view(
    storage_ptr: *const FfiStorage,
    name: *const c_char,
    id: *const c_char,
    method: *const c_char,
    args_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let req = storage(storage_ptr).zip(c_str(name)).and_then(|(storage, name)| {
            let method = c_str(method)?;
            let args = args_arg(args_json)?;
            let endpoint = &storage.endpoint;
            let url = remote_storage_core::endpoint::named(&target(endpoint, name, c_str(id)), method);
            Some(engine::build_view(&url, endpoint.authorization(), &args))
        });
        request_or_null(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a named operation (`POST .../~method`). `args_json` and
/// `body_json` may each be null; a `body_json` of `null` sends no body.
#[unsafe(no_mangle)]
pub extern "C" fn rs_build_operation(
    storage_ptr: *const FfiStorage,
    name: *const c_char,
    id: *const c_char,
    method: *const c_char,
    args_json: *const c_char,
    body_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        let req = storage(storage_ptr).zip(c_str(name)).and_then(|(storage, name)| {
            let method = c_str(method)?;
            let args = args_arg(args_json)?;
            let body = body_arg(body_json).ok()?;
            let endpoint = &storage.endpoint;
            let url = remote_storage_core::endpoint::named(&target(endpoint, name, c_str(id)), method);
            engine::build_operation(&url, endpoint.authorization(), &args, body.as_ref()).ok()
        });
        request_or_null(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() || resp.body_len == 0 {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(resp.body, resp.body_len) }.to_vec()
    };
    HttpResponse::new(resp.status, body)
}

/// Shared shape of every parse entry point.
fn parse_with(
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&HttpResponse) -> Result<Outcome<Value>, StorageError>,
) -> *mut FfiOutcome {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if response.is_null() {
            return FfiOutcome::null_arg();
        }
        let resp = ffi_response_to_core(unsafe { &*response });
        FfiOutcome::from_core(Outcome::capture(parse(&resp)))
    }))
    .unwrap_or_else(|_| FfiOutcome::panic())
}

/// Parse a list response. On success `payload_tag` is `Elements`.
#[unsafe(no_mangle)]
pub extern "C" fn rs_parse_list(response: *const FfiHttpResponse) -> *mut FfiOutcome {
    parse_with(response, |resp| engine::parse_list(resp).map(Outcome::with_elements))
}

/// Parse a read response. On success `payload_tag` is `Element`.
#[unsafe(no_mangle)]
pub extern "C" fn rs_parse_read(response: *const FfiHttpResponse) -> *mut FfiOutcome {
    parse_with(response, |resp| engine::parse_read(resp).map(Outcome::with_element))
}

/// Parse a create response. On success the code is `Created` and the
/// payload is the new id, empty when the server did not report one.
#[unsafe(no_mangle)]
pub extern "C" fn rs_parse_create(response: *const FfiHttpResponse) -> *mut FfiOutcome {
    parse_with(response, |resp| engine::parse_create(resp).map(Outcome::created))
}

/// Parse an update, replace or delete response. No payload.
#[unsafe(no_mangle)]
pub extern "C" fn rs_parse_write(response: *const FfiHttpResponse) -> *mut FfiOutcome {
    parse_with(response, |resp| engine::parse_empty(resp).map(|()| Outcome::ok()))
}

/// Parse a view or operation response. On success `payload_tag` is
/// `Element`.
#[unsafe(no_mangle)]
pub extern "C" fn rs_parse_call(response: *const FfiHttpResponse) -> *mut FfiOutcome {
    parse_with(response, |resp| engine::parse_call(resp).map(Outcome::with_element))
}

/// Outcome for a request the host could not complete (no response at
/// all): always `Unreachable`.
#[unsafe(no_mangle)]
pub extern "C" fn rs_connection_failed() -> *mut FfiOutcome {
    catch_unwind(|| FfiOutcome::from_core(Outcome::from_error(ResultCode::Unreachable.into())))
        .unwrap_or_else(|_| FfiOutcome::panic())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by any `rs_build_*` function. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn rs_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for header in headers.iter() {
                free_c_string(header.key);
                free_c_string(header.value);
            }
        }
    });
}

/// Free an outcome returned by any `rs_parse_*` function or
/// `rs_connection_failed`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rs_free_outcome(outcome: *mut FfiOutcome) {
    if outcome.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let outcome = unsafe { Box::from_raw(outcome) };
        free_c_string(outcome.request_error_code);
        free_c_string(outcome.validation_errors);
        free_c_string(outcome.payload);
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::ffi::CString;

    fn new_storage() -> *mut FfiStorage {
        let base = CString::new("http://localhost:6666").unwrap();
        let scheme = CString::new("Bearer").unwrap();
        let token = CString::new("abcdef").unwrap();
        rs_storage_new(base.as_ptr(), scheme.as_ptr(), token.as_ptr())
    }

    fn read_str(ptr: *const c_char) -> String {
        assert!(!ptr.is_null());
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    fn headers(req: &FfiHttpRequest) -> Vec<(String, String)> {
        if req.headers.is_null() {
            return Vec::new();
        }
        unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) }
            .iter()
            .map(|h| (read_str(h.key), read_str(h.value)))
            .collect()
    }

    fn response(status: u16, body: &str) -> FfiHttpResponse {
        FfiHttpResponse {
            status,
            body: body.as_ptr(),
            body_len: body.len(),
        }
    }

    #[test]
    fn storage_new_and_free() {
        let storage = new_storage();
        assert!(!storage.is_null());
        rs_storage_free(storage);
    }

    #[test]
    fn storage_new_null_returns_null() {
        let base = CString::new("http://localhost:6666").unwrap();
        let storage = rs_storage_new(base.as_ptr(), std::ptr::null(), std::ptr::null());
        assert!(storage.is_null());
        rs_storage_free(std::ptr::null_mut());
    }

    #[test]
    fn build_list_carries_cursor_and_authorization() {
        let storage = new_storage();
        let name = CString::new("accounts").unwrap();
        let req = rs_build_list(storage, name.as_ptr(), 0, 20);
        assert!(!req.is_null());

        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Get);
        assert_eq!(read_str(r.url), "http://localhost:6666/accounts?offset=0&limit=20");
        assert_eq!(
            headers(r),
            vec![("authorization".to_string(), "Bearer abcdef".to_string())]
        );
        assert!(r.body.is_null());

        rs_free_request(req);
        rs_storage_free(storage);
    }

    #[test]
    fn build_null_storage_returns_null() {
        let name = CString::new("accounts").unwrap();
        assert!(rs_build_list(std::ptr::null(), name.as_ptr(), 0, 20).is_null());
        assert!(rs_build_read(std::ptr::null(), name.as_ptr(), std::ptr::null()).is_null());
    }

    #[test]
    fn build_read_simple_and_item() {
        let storage = new_storage();
        let universe = CString::new("universe").unwrap();
        let req = rs_build_read(storage, universe.as_ptr(), std::ptr::null());
        assert_eq!(read_str(unsafe { &*req }.url), "http://localhost:6666/universe");
        rs_free_request(req);

        let accounts = CString::new("accounts").unwrap();
        let id = CString::new("a1").unwrap();
        let req = rs_build_delete(storage, accounts.as_ptr(), id.as_ptr());
        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Delete);
        assert_eq!(read_str(r.url), "http://localhost:6666/accounts/a1");
        rs_free_request(req);
        rs_storage_free(storage);
    }

    #[test]
    fn build_create_sends_json_body() {
        let storage = new_storage();
        let name = CString::new("accounts").unwrap();
        let body = CString::new(r#"{"name":"My-Account"}"#).unwrap();
        let req = rs_build_create(storage, name.as_ptr(), body.as_ptr());
        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Post);
        assert!(headers(r).contains(&("content-type".to_string(), "application/json".to_string())));
        let sent: Value = serde_json::from_str(&read_str(r.body)).unwrap();
        assert_eq!(sent, json!({"name": "My-Account"}));
        rs_free_request(req);
        rs_storage_free(storage);
    }

    #[test]
    fn json_null_body_sends_no_body() {
        let storage = new_storage();
        let name = CString::new("accounts").unwrap();
        let null = CString::new("null").unwrap();
        let req = rs_build_create(storage, name.as_ptr(), null.as_ptr());
        let r = unsafe { &*req };
        assert!(r.body.is_null());
        assert!(headers(r).iter().all(|(key, _)| key != "content-type"));
        rs_free_request(req);

        let op = CString::new("reset").unwrap();
        let req = rs_build_operation(
            storage,
            name.as_ptr(),
            std::ptr::null(),
            op.as_ptr(),
            std::ptr::null(),
            null.as_ptr(),
        );
        let r = unsafe { &*req };
        assert_eq!(read_str(r.url), "http://localhost:6666/accounts/~reset");
        assert!(r.body.is_null());
        assert!(headers(r).iter().all(|(key, _)| key != "content-type"));
        rs_free_request(req);
        rs_storage_free(storage);
    }

    #[test]
    fn build_rejects_invalid_json() {
        let storage = new_storage();
        let name = CString::new("universe").unwrap();
        let bad = CString::new("{not json").unwrap();
        assert!(rs_build_create(storage, name.as_ptr(), bad.as_ptr()).is_null());
        assert!(rs_build_update(storage, name.as_ptr(), std::ptr::null(), bad.as_ptr()).is_null());
        assert!(rs_build_update(storage, name.as_ptr(), std::ptr::null(), std::ptr::null()).is_null());
        rs_storage_free(storage);
    }

    #[test]
    fn build_update_and_replace_verbs() {
        let storage = new_storage();
        let name = CString::new("universe").unwrap();
        let patch = CString::new(r#"{"$set":{"caption":"x"}}"#).unwrap();
        let req = rs_build_update(storage, name.as_ptr(), std::ptr::null(), patch.as_ptr());
        assert_eq!(unsafe { &*req }.method, FfiHttpMethod::Patch);
        rs_free_request(req);

        let body = CString::new(r#"{"caption":"x","motd":"y"}"#).unwrap();
        let req = rs_build_replace(storage, name.as_ptr(), std::ptr::null(), body.as_ptr());
        assert_eq!(unsafe { &*req }.method, FfiHttpMethod::Put);
        rs_free_request(req);
        rs_storage_free(storage);
    }

    #[test]
    fn build_named_calls() {
        let storage = new_storage();
        let name = CString::new("accounts").unwrap();
        let id = CString::new("a1").unwrap();
        let view = CString::new("total-items-for-type").unwrap();
        let args = CString::new(r#"{"type":"112358"}"#).unwrap();
        let req = rs_build_view(storage, name.as_ptr(), id.as_ptr(), view.as_ptr(), args.as_ptr());
        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Get);
        assert_eq!(
            read_str(r.url),
            "http://localhost:6666/accounts/a1/~total-items-for-type?type=112358"
        );
        rs_free_request(req);

        let op = CString::new("add-items-for-type").unwrap();
        let body = CString::new(r#"{"item":"112358","by":"10"}"#).unwrap();
        let req = rs_build_operation(
            storage,
            name.as_ptr(),
            id.as_ptr(),
            op.as_ptr(),
            std::ptr::null(),
            body.as_ptr(),
        );
        let r = unsafe { &*req };
        assert_eq!(r.method, FfiHttpMethod::Post);
        assert_eq!(read_str(r.url), "http://localhost:6666/accounts/a1/~add-items-for-type");
        assert!(!r.body.is_null());
        rs_free_request(req);

        let not_an_object = CString::new("[1,2]").unwrap();
        let req = rs_build_view(storage, name.as_ptr(), id.as_ptr(), view.as_ptr(), not_an_object.as_ptr());
        assert!(req.is_null());
        rs_storage_free(storage);
    }

    #[test]
    fn parse_list_returns_json_array() {
        let resp = response(200, r#"[{"name":"a"},{"name":"b"}]"#);
        let outcome = rs_parse_list(&resp);
        let o = unsafe { &*outcome };
        assert_eq!(o.code, FfiResultCode::Ok);
        assert_eq!(o.payload_tag, FfiPayloadTag::Elements);
        let elements: Value = serde_json::from_str(&read_str(o.payload)).unwrap();
        assert_eq!(elements, json!([{"name": "a"}, {"name": "b"}]));
        rs_free_outcome(outcome);
    }

    #[test]
    fn parse_create_returns_id() {
        let resp = response(201, r#"{"id":"abc123"}"#);
        let outcome = rs_parse_create(&resp);
        let o = unsafe { &*outcome };
        assert_eq!(o.code, FfiResultCode::Created);
        assert_eq!(o.payload_tag, FfiPayloadTag::CreatedId);
        assert_eq!(read_str(o.payload), "abc123");
        rs_free_outcome(outcome);
    }

    #[test]
    fn parse_validation_error_keeps_details() {
        let resp = response(400, r#"{"code":"schema:invalid","errors":{"name":["required"]}}"#);
        let outcome = rs_parse_create(&resp);
        let o = unsafe { &*outcome };
        assert_eq!(o.code, FfiResultCode::ValidationError);
        assert_eq!(o.payload_tag, FfiPayloadTag::None);
        assert!(o.payload.is_null());
        assert!(o.request_error_code.is_null());
        let errors: Value = serde_json::from_str(&read_str(o.validation_errors)).unwrap();
        assert_eq!(errors, json!({"name": ["required"]}));
        rs_free_outcome(outcome);
    }

    #[test]
    fn parse_bad_request_keeps_custom_code() {
        let resp = response(400, r#"{"code":"custom:thing"}"#);
        let outcome = rs_parse_write(&resp);
        let o = unsafe { &*outcome };
        assert_eq!(o.code, FfiResultCode::BadRequest);
        assert_eq!(read_str(o.request_error_code), "custom:thing");
        rs_free_outcome(outcome);
    }

    #[test]
    fn parse_write_and_call() {
        let empty = FfiHttpResponse {
            status: 204,
            body: std::ptr::null(),
            body_len: 0,
        };
        let outcome = rs_parse_write(&empty);
        let o = unsafe { &*outcome };
        assert_eq!(o.code, FfiResultCode::Ok);
        assert!(o.payload.is_null());
        rs_free_outcome(outcome);

        let resp = response(200, r#"{"total":10}"#);
        let outcome = rs_parse_call(&resp);
        let o = unsafe { &*outcome };
        assert_eq!(o.payload_tag, FfiPayloadTag::Element);
        assert_eq!(read_str(o.payload), r#"{"total":10}"#);
        rs_free_outcome(outcome);

        let resp = response(404, "");
        let outcome = rs_parse_read(&resp);
        assert_eq!(unsafe { &*outcome }.code, FfiResultCode::DoesNotExist);
        rs_free_outcome(outcome);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let outcome = rs_parse_read(std::ptr::null());
        assert_eq!(unsafe { &*outcome }.code, FfiResultCode::NullArg);
        rs_free_outcome(outcome);
    }

    #[test]
    fn connection_failure_is_unreachable() {
        let outcome = rs_connection_failed();
        let o = unsafe { &*outcome };
        assert_eq!(o.code, FfiResultCode::Unreachable);
        assert!(o.payload.is_null());
        rs_free_outcome(outcome);
    }

    #[test]
    fn free_null_is_safe() {
        rs_free_request(std::ptr::null_mut());
        rs_free_outcome(std::ptr::null_mut());
    }
}
