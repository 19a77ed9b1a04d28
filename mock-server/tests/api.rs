use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, DEFAULT_TOKEN};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {DEFAULT_TOKEN}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    request("GET", uri, "")
}

async fn send(app: &Router, req: Request<String>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn create_account(app: &Router, name: &str) -> String {
    let body = json!({"name": name, "address": "Somewhere"}).to_string();
    let resp = send(app, request("POST", "/accounts", &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["id"].as_str().unwrap().to_string()
}

const UNIVERSE: &str = r#"{"caption":"My Universe","motd":"Welcome!","version":{"major":1,"minor":0,"revision":0}}"#;

// --- authorization ---

#[tokio::test]
async fn missing_authorization_header() {
    let resp = app()
        .oneshot(Request::builder().uri("/accounts").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await, json!({"code": "authorization:missing-header"}));
}

#[tokio::test]
async fn wrong_scheme() {
    let req = Request::builder()
        .uri("/accounts")
        .header(http::header::AUTHORIZATION, format!("Basic {DEFAULT_TOKEN}"))
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "authorization:bad-scheme");
}

#[tokio::test]
async fn wrong_token_is_unauthorized() {
    let req = Request::builder()
        .uri("/accounts")
        .header(http::header::AUTHORIZATION, "Bearer nope")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(resp).await.is_empty());
}

// --- universe ---

#[tokio::test]
async fn universe_lifecycle() {
    let app = app();
    assert_eq!(send(&app, get("/universe")).await.status(), StatusCode::NOT_FOUND);

    let resp = send(&app, request("POST", "/universe", UNIVERSE)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&app, request("POST", "/universe", UNIVERSE)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await, json!({"code": "already-exists"}));

    let patch = r#"{"$set":{"caption":"Renamed","version.revision":1}}"#;
    assert_eq!(send(&app, request("PATCH", "/universe", patch)).await.status(), StatusCode::OK);

    let universe = body_json(send(&app, get("/universe")).await).await;
    assert_eq!(universe["caption"], "Renamed");
    assert_eq!(universe["version"], json!({"major": 1, "minor": 0, "revision": 1}));

    let version = body_json(send(&app, get("/universe/~version")).await).await;
    assert_eq!(version["version"]["revision"], 1);

    let resp = send(&app, request("POST", "/universe/~set-motd", r#"{"motd":"Hi"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"motd": "Hi"}));

    assert_eq!(send(&app, request("DELETE", "/universe", "")).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(send(&app, get("/universe")).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn universe_schema_errors() {
    let resp = app()
        .oneshot(request("POST", "/universe", r#"{"caption":7}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({
            "code": "schema:invalid",
            "errors": {"caption": ["must be a string"], "motd": ["required"]}
        })
    );
}

#[tokio::test]
async fn unsupported_update_operator() {
    let app = app();
    send(&app, request("POST", "/universe", UNIVERSE)).await;
    let resp = send(&app, request("PATCH", "/universe", r#"{"$inc":{"x":1}}"#)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "update:unsupported-operator");
}

#[tokio::test]
async fn malformed_json_is_format_error() {
    let resp = app()
        .oneshot(request("POST", "/accounts", "{not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await, json!({"code": "format:unexpected"}));
}

#[tokio::test]
async fn view_verb_mismatch() {
    let app = app();
    send(&app, request("POST", "/universe", UNIVERSE)).await;
    let resp = send(&app, request("POST", "/universe/~version", "")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(send(&app, get("/universe/~nope")).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn universe_in_use_while_accounts_exist() {
    let app = app();
    send(&app, request("POST", "/universe", UNIVERSE)).await;
    create_account(&app, "Alice").await;
    let resp = send(&app, request("DELETE", "/universe", "")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["code"], "in-use");
}

// --- accounts ---

#[tokio::test]
async fn list_accounts_empty() {
    let resp = app().oneshot(get("/accounts")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn list_pages_and_projects() {
    let app = app();
    for name in ["a", "b", "c"] {
        create_account(&app, name).await;
    }
    let page = body_json(send(&app, get("/accounts?offset=1&limit=1")).await).await;
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["name"], "b");
    assert!(page[0].get("inventory").is_none());
}

#[tokio::test]
async fn duplicate_account_name() {
    let app = app();
    create_account(&app, "Alice").await;
    let body = json!({"name": "Alice", "address": "Elsewhere"}).to_string();
    let resp = send(&app, request("POST", "/accounts", &body)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await, json!({"code": "duplicate-key"}));
}

#[tokio::test]
async fn read_replace_delete_account() {
    let app = app();
    let id = create_account(&app, "Alice").await;
    let uri = format!("/accounts/{id}");

    let account = body_json(send(&app, get(&uri)).await).await;
    assert_eq!(account["_id"], id.as_str());
    assert_eq!(account["name"], "Alice");

    let replacement = json!({"name": "Alicia", "address": "Moved"}).to_string();
    assert_eq!(send(&app, request("PUT", &uri, &replacement)).await.status(), StatusCode::OK);
    let account = body_json(send(&app, get(&uri)).await).await;
    assert_eq!(account["address"], "Moved");
    assert_eq!(account["_id"], id.as_str());

    assert_eq!(send(&app, request("DELETE", &uri, "")).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(send(&app, get(&uri)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(&app, request("DELETE", &uri, "")).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inventory_calls() {
    let app = app();
    let id = create_account(&app, "Alice").await;

    let add = format!("/accounts/{id}/~add-items-for-type");
    let resp = send(&app, request("POST", &add, r#"{"item":"112358","by":"10"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"type": "112358", "total": 10}));

    let for_type = body_json(send(&app, get(&format!("/accounts/{id}/~total-items-for-type?type=112358"))).await).await;
    assert_eq!(for_type["total"], 10);

    let total = body_json(send(&app, get(&format!("/accounts/{id}/~total-items"))).await).await;
    assert_eq!(total, json!({"total": 10}));

    let everything = body_json(send(&app, get("/accounts/~total-items")).await).await;
    assert_eq!(everything, json!({"total": 10}));

    let subtract = format!("/accounts/{id}/~subtract-items-for-type");
    let resp = send(&app, request("POST", &subtract, r#"{"item":"112358","by":"11"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn view_missing_argument() {
    let app = app();
    let id = create_account(&app, "Alice").await;
    let resp = send(&app, get(&format!("/accounts/{id}/~total-items-for-type"))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({"code": "schema:invalid", "errors": {"type": ["required"]}})
    );
}
