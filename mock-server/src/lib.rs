//! In-memory stand-in for the MongoDB-backed storage service.
//!
//! Serves a `universe` simple resource and an `accounts` list resource with
//! the same status codes and error bodies as the real service, so the
//! client can be exercised end-to-end without a database.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_TOKEN: &str = "abcdef";

pub type Document = Map<String, Value>;

#[derive(Default)]
pub struct Store {
    universe: Option<Document>,
    accounts: Vec<Document>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    token: Arc<str>,
    db: Db,
}

/// Failure responses, shaped the way the storage service shapes them.
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, errors: Option<Value> },
    Conflict(&'static str),
    Unauthorized,
    NotFound,
    MethodNotAllowed,
}

impl ApiError {
    fn code(code: &str) -> Self {
        ApiError::BadRequest {
            code: code.to_string(),
            errors: None,
        }
    }

    fn invalid(errors: Document) -> Self {
        ApiError::BadRequest {
            code: "schema:invalid".to_string(),
            errors: Some(Value::Object(errors)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest { code, errors } => {
                let mut body = json!({ "code": code });
                if let Some(errors) = errors {
                    body["errors"] = errors;
                }
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Conflict(code) => {
                (StatusCode::CONFLICT, Json(json!({ "code": code }))).into_response()
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn app() -> Router {
    app_with_token(DEFAULT_TOKEN)
}

pub fn app_with_token(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        db: Db::default(),
    };
    Router::new()
        .route(
            "/universe",
            get(read_universe)
                .post(create_universe)
                .put(replace_universe)
                .patch(update_universe)
                .delete(delete_universe),
        )
        .route("/universe/{method}", get(universe_view).post(universe_operation))
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{id}",
            get(read_account)
                .post(accounts_operation)
                .put(replace_account)
                .patch(update_account)
                .delete(delete_account),
        )
        .route(
            "/accounts/{id}/{method}",
            get(account_view).post(account_operation),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(token)).await
}

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match authorize(request.headers(), &state.token) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

fn authorize(headers: &HeaderMap, token: &str) -> ApiResult<()> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::code("authorization:missing-header"))?;
    let (scheme, credentials) = value.split_once(' ').unwrap_or((value, ""));
    if scheme != "Bearer" {
        return Err(ApiError::code("authorization:bad-scheme"));
    }
    if credentials != token {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

fn parse_document(body: &[u8]) -> ApiResult<Document> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(document)) => Ok(document),
        _ => Err(ApiError::code("format:unexpected")),
    }
}

fn require_string(document: &Document, field: &str, errors: &mut Document) {
    match document.get(field) {
        Some(Value::String(value)) if !value.is_empty() => {}
        Some(Value::String(_)) => {
            errors.insert(field.to_string(), json!(["empty"]));
        }
        Some(_) => {
            errors.insert(field.to_string(), json!(["must be a string"]));
        }
        None => {
            errors.insert(field.to_string(), json!(["required"]));
        }
    }
}

fn validate_universe(document: &Document) -> ApiResult<()> {
    let mut errors = Document::new();
    require_string(document, "caption", &mut errors);
    require_string(document, "motd", &mut errors);
    if let Some(version) = document.get("version") {
        let valid = version.as_object().is_some_and(|version| {
            ["major", "minor", "revision"]
                .iter()
                .all(|part| version.get(*part).is_some_and(Value::is_u64))
        });
        if !valid {
            errors.insert("version".to_string(), json!(["invalid"]));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::invalid(errors))
    }
}

fn validate_account(document: &Document) -> ApiResult<()> {
    let mut errors = Document::new();
    require_string(document, "name", &mut errors);
    require_string(document, "address", &mut errors);
    if let Some(inventory) = document.get("inventory") {
        let valid = inventory
            .as_object()
            .is_some_and(|items| items.values().all(Value::is_string));
        if !valid {
            errors.insert("inventory".to_string(), json!(["invalid"]));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::invalid(errors))
    }
}

/// Apply a `{"$set": {...}, "$unset": {...}}` update document. Keys may
/// be dotted paths into nested documents.
fn apply_update(document: &mut Document, patch: &Document) -> ApiResult<()> {
    for (operator, fields) in patch {
        let fields = fields
            .as_object()
            .ok_or_else(|| ApiError::code("format:unexpected"))?;
        match operator.as_str() {
            "$set" => {
                for (path, value) in fields {
                    set_path(document, path, value.clone());
                }
            }
            "$unset" => {
                for path in fields.keys() {
                    unset_path(document, path);
                }
            }
            _ => return Err(ApiError::code("update:unsupported-operator")),
        }
    }
    Ok(())
}

fn set_path(document: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            document.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = document
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Document::new()));
            if !child.is_object() {
                *child = Value::Object(Document::new());
            }
            if let Value::Object(child) = child {
                set_path(child, rest, value);
            }
        }
    }
}

fn unset_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Object(child)) = document.get_mut(head) {
                unset_path(child, rest);
            }
        }
    }
}

fn quantity(value: &Value) -> i64 {
    value.as_str().and_then(|q| q.parse().ok()).unwrap_or(0)
}

fn total_items(account: &Document) -> i64 {
    account
        .get("inventory")
        .and_then(Value::as_object)
        .map(|items| items.values().map(quantity).sum())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Universe (simple resource)
// ---------------------------------------------------------------------------

async fn read_universe(State(state): State<AppState>) -> ApiResult<Json<Document>> {
    let store = state.db.read().await;
    store.universe.clone().map(Json).ok_or(ApiError::NotFound)
}

async fn create_universe(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let document = parse_document(&body)?;
    validate_universe(&document)?;
    let mut store = state.db.write().await;
    if store.universe.is_some() {
        return Err(ApiError::Conflict("already-exists"));
    }
    store.universe = Some(document);
    debug!("universe created");
    Ok((StatusCode::CREATED, Json(json!({ "id": "universe" }))))
}

async fn replace_universe(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let document = parse_document(&body)?;
    validate_universe(&document)?;
    let mut store = state.db.write().await;
    let universe = store.universe.as_mut().ok_or(ApiError::NotFound)?;
    *universe = document;
    Ok(StatusCode::OK)
}

async fn update_universe(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let patch = parse_document(&body)?;
    let mut store = state.db.write().await;
    let universe = store.universe.as_mut().ok_or(ApiError::NotFound)?;
    let mut updated = universe.clone();
    apply_update(&mut updated, &patch)?;
    validate_universe(&updated)?;
    *universe = updated;
    Ok(StatusCode::OK)
}

async fn delete_universe(State(state): State<AppState>) -> ApiResult<StatusCode> {
    let mut store = state.db.write().await;
    if store.universe.is_none() {
        return Err(ApiError::NotFound);
    }
    if !store.accounts.is_empty() {
        return Err(ApiError::Conflict("in-use"));
    }
    store.universe = None;
    Ok(StatusCode::NO_CONTENT)
}

async fn universe_view(
    State(state): State<AppState>,
    Path(method): Path<String>,
) -> ApiResult<Json<Value>> {
    let store = state.db.read().await;
    let universe = store.universe.as_ref().ok_or(ApiError::NotFound)?;
    match method.as_str() {
        "~version" => Ok(Json(json!({
            "version": universe.get("version").cloned().unwrap_or(Value::Null)
        }))),
        "~set-motd" => Err(ApiError::MethodNotAllowed),
        _ => Err(ApiError::NotFound),
    }
}

async fn universe_operation(
    State(state): State<AppState>,
    Path(method): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    match method.as_str() {
        "~set-motd" => {}
        "~version" => return Err(ApiError::MethodNotAllowed),
        _ => return Err(ApiError::NotFound),
    }
    let input = parse_document(&body)?;
    let mut errors = Document::new();
    require_string(&input, "motd", &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::invalid(errors));
    }
    let mut store = state.db.write().await;
    let universe = store.universe.as_mut().ok_or(ApiError::NotFound)?;
    let motd = input.get("motd").cloned().unwrap_or(Value::Null);
    universe.insert("motd".to_string(), motd.clone());
    Ok(Json(json!({ "motd": motd })))
}

// ---------------------------------------------------------------------------
// Accounts (list resource)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Paging {
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    20
}

/// List projection: inventories are left out.
fn project(account: &Document) -> Document {
    account
        .iter()
        .filter(|(key, _)| key.as_str() != "inventory")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn id_of(account: &Document) -> Option<&str> {
    account.get("_id").and_then(Value::as_str)
}

fn lookup<'a>(accounts: &'a [Document], id: &str) -> ApiResult<&'a Document> {
    accounts
        .iter()
        .find(|account| id_of(account) == Some(id))
        .ok_or(ApiError::NotFound)
}

fn find<'a>(accounts: &'a mut [Document], id: &str) -> ApiResult<&'a mut Document> {
    accounts
        .iter_mut()
        .find(|account| id_of(account) == Some(id))
        .ok_or(ApiError::NotFound)
}

fn name_taken(accounts: &[Document], name: Option<&Value>, except: Option<&str>) -> bool {
    accounts
        .iter()
        .filter(|account| id_of(account) != except)
        .any(|account| account.get("name") == name)
}

async fn list_accounts(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> Json<Vec<Document>> {
    let store = state.db.read().await;
    Json(
        store
            .accounts
            .iter()
            .skip(paging.offset)
            .take(paging.limit)
            .map(project)
            .collect(),
    )
}

async fn create_account(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut document = parse_document(&body)?;
    document.remove("_id");
    validate_account(&document)?;
    let mut store = state.db.write().await;
    if name_taken(&store.accounts, document.get("name"), None) {
        return Err(ApiError::Conflict("duplicate-key"));
    }
    let id = Uuid::new_v4().simple().to_string();
    document.insert("_id".to_string(), Value::String(id.clone()));
    store.accounts.push(document);
    debug!(%id, "account created");
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn read_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(args): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let store = state.db.read().await;
    if let Some(method) = id.strip_prefix('~') {
        return match method {
            "total-items" => {
                let total: i64 = store.accounts.iter().map(total_items).sum();
                Ok(Json(json!({ "total": total })))
            }
            _ => {
                debug!(method, ?args, "unknown collection view");
                Err(ApiError::NotFound)
            }
        };
    }
    let account = lookup(&store.accounts, &id)?;
    Ok(Json(Value::Object(account.clone())))
}

async fn accounts_operation(Path(id): Path<String>) -> ApiError {
    if id.starts_with('~') {
        ApiError::NotFound
    } else {
        ApiError::MethodNotAllowed
    }
}

async fn replace_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let mut document = parse_document(&body)?;
    validate_account(&document)?;
    let mut store = state.db.write().await;
    if name_taken(&store.accounts, document.get("name"), Some(&id)) {
        return Err(ApiError::Conflict("duplicate-key"));
    }
    let account = find(&mut store.accounts, &id)?;
    document.insert("_id".to_string(), Value::String(id));
    *account = document;
    Ok(StatusCode::OK)
}

async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let patch = parse_document(&body)?;
    let mut store = state.db.write().await;
    let mut updated = find(&mut store.accounts, &id)?.clone();
    apply_update(&mut updated, &patch)?;
    updated.insert("_id".to_string(), Value::String(id.clone()));
    validate_account(&updated)?;
    if name_taken(&store.accounts, updated.get("name"), Some(&id)) {
        return Err(ApiError::Conflict("duplicate-key"));
    }
    *find(&mut store.accounts, &id)? = updated;
    Ok(StatusCode::OK)
}

async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = state.db.write().await;
    let before = store.accounts.len();
    store.accounts.retain(|account| id_of(account) != Some(id.as_str()));
    if store.accounts.len() == before {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn account_view(
    State(state): State<AppState>,
    Path((id, method)): Path<(String, String)>,
    Query(args): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let store = state.db.read().await;
    let account = lookup(&store.accounts, &id)?;
    match method.as_str() {
        "~total-items" => Ok(Json(json!({ "total": total_items(account) }))),
        "~total-items-for-type" => {
            let item = args.get("type").ok_or_else(|| {
                let mut errors = Document::new();
                errors.insert("type".to_string(), json!(["required"]));
                ApiError::invalid(errors)
            })?;
            let total = account
                .get("inventory")
                .and_then(|inventory| inventory.get(item))
                .map(quantity)
                .unwrap_or(0);
            Ok(Json(json!({ "type": item, "total": total })))
        }
        "~add-items-for-type" | "~subtract-items-for-type" => Err(ApiError::MethodNotAllowed),
        _ => Err(ApiError::NotFound),
    }
}

#[derive(Deserialize)]
struct ItemDelta {
    item: String,
    by: String,
}

async fn account_operation(
    State(state): State<AppState>,
    Path((id, method)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let sign = match method.as_str() {
        "~add-items-for-type" => 1,
        "~subtract-items-for-type" => -1,
        "~total-items" | "~total-items-for-type" => return Err(ApiError::MethodNotAllowed),
        _ => return Err(ApiError::NotFound),
    };
    let delta: ItemDelta = serde_json::from_slice(&body).map_err(|_| {
        let mut errors = Document::new();
        errors.insert("item".to_string(), json!(["required"]));
        errors.insert("by".to_string(), json!(["required"]));
        ApiError::invalid(errors)
    })?;
    let by: i64 = delta.by.parse().map_err(|_| {
        let mut errors = Document::new();
        errors.insert("by".to_string(), json!(["must be an integer"]));
        ApiError::invalid(errors)
    })?;

    let mut store = state.db.write().await;
    let account = find(&mut store.accounts, &id)?;
    let inventory = account
        .entry("inventory".to_string())
        .or_insert_with(|| Value::Object(Document::new()));
    let Value::Object(inventory) = inventory else {
        return Err(ApiError::code("format:unexpected"));
    };
    let current = inventory.get(&delta.item).map(quantity).unwrap_or(0);
    let total = current + sign * by;
    if total < 0 {
        return Err(ApiError::Conflict("insufficient-items"));
    }
    inventory.insert(delta.item.clone(), Value::String(total.to_string()));
    Ok(Json(json!({ "type": delta.item, "total": total })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(document) => document,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn set_supports_dotted_paths() {
        let mut universe = doc(json!({"caption": "a", "version": {"major": 1}}));
        let patch = doc(json!({"$set": {"caption": "b", "version.revision": 9}}));
        apply_update(&mut universe, &patch).unwrap();
        assert_eq!(
            Value::Object(universe),
            json!({"caption": "b", "version": {"major": 1, "revision": 9}})
        );
    }

    #[test]
    fn unset_removes_fields() {
        let mut account = doc(json!({"name": "a", "address": "b"}));
        apply_update(&mut account, &doc(json!({"$unset": {"address": ""}}))).unwrap();
        assert!(account.get("address").is_none());
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let mut account = doc(json!({"name": "a"}));
        let err = apply_update(&mut account, &doc(json!({"$inc": {"n": 1}}))).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { ref code, .. } if code == "update:unsupported-operator"));
    }

    #[test]
    fn account_validation_reports_each_field() {
        let err = validate_account(&doc(json!({"name": ""}))).unwrap_err();
        let ApiError::BadRequest { code, errors } = err else {
            panic!("expected a bad request");
        };
        assert_eq!(code, "schema:invalid");
        assert_eq!(errors, Some(json!({"name": ["empty"], "address": ["required"]})));
    }

    #[test]
    fn list_projection_drops_inventory() {
        let account = doc(json!({"_id": "1", "name": "a", "inventory": {"x": "1"}}));
        assert_eq!(Value::Object(project(&account)), json!({"_id": "1", "name": "a"}));
    }

    #[test]
    fn lookup_matches_on_id() {
        let accounts = vec![doc(json!({"_id": "1", "name": "a"})), doc(json!({"_id": "2", "name": "b"}))];
        assert_eq!(lookup(&accounts, "2").unwrap().get("name"), Some(&json!("b")));
        assert!(matches!(lookup(&accounts, "3"), Err(ApiError::NotFound)));
    }

    #[test]
    fn totals_ignore_unparsable_quantities() {
        let account = doc(json!({"inventory": {"a": "10", "b": "x", "c": "5"}}));
        assert_eq!(total_items(&account), 15);
    }
}
