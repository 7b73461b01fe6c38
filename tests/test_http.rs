//! HTTP contract tests: status codes, error body shape, and bearer-token
//! rejection, driven through the real router with fixture backends.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use wheelhouse::api::{auth, router, state::AppState};
use wheelhouse::screener::{OptionsProvider, ProviderError, QueryRequest, QueryResponse};
use wheelhouse::store::MemoryTradeStore;

const SECRET: &str = "test-signing-secret";

struct EmptyProvider;

#[async_trait]
impl OptionsProvider for EmptyProvider {
    async fn query(&self, _request: &QueryRequest) -> Result<QueryResponse, ProviderError> {
        Ok(QueryResponse {
            options: Vec::new(),
            count: 0,
        })
    }
}

fn test_app() -> (Router, Arc<MemoryTradeStore>) {
    let store = Arc::new(MemoryTradeStore::new());
    let state = AppState::new(
        store.clone(),
        Arc::new(EmptyProvider),
        SECRET.to_string(),
        "options-screener".to_string(),
        "svc".to_string(),
    );
    (router(state), store)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_req(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn missing_symbol_is_a_400_validation_error() {
    let (app, _) = test_app();
    let (status, body) = send(&app, get("/options")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
    assert!(body["details"].as_str().unwrap().contains("symbol"));
}

#[tokio::test]
async fn trades_require_a_valid_bearer_token() {
    let (app, _) = test_app();

    // No header at all.
    let (status, body) = send(&app, get("/trades")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AuthError");

    // Wrong scheme.
    let req = Request::builder()
        .uri("/trades")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwdw==")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AuthError");

    // Token signed with a different secret.
    let forged = auth::create_jwt("u1", "some-other-secret").unwrap();
    let req = Request::builder()
        .uri("/trades")
        .header(header::AUTHORIZATION, format!("Bearer {forged}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AuthError");
}

#[tokio::test]
async fn authed_trade_lifecycle_round_trips() {
    let (app, _) = test_app();
    let token = auth::create_jwt("u1", SECRET).unwrap();

    let create = json!({
        "symbol": "AAPL",
        "type": "put",
        "strike": 170.0,
        "expiration": "2030-01-17",
        "premium": 2.1,
    });
    let (status, created) =
        send(&app, json_req("POST", "/trades", Some(&token), &create)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"], "Open");
    assert_eq!(created["userId"], "u1");
    let id = created["id"].as_str().unwrap().to_string();

    let req = Request::builder()
        .uri("/trades")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, listed) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let close = json!({ "id": id, "status": "Closed", "closingCost": 0.4 });
    let (status, closed) =
        send(&app, json_req("PUT", "/trades", Some(&token), &close)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "Closed");
    assert_eq!(closed["closingCost"], 0.4);

    // Updating an unknown trade is a 404 with the NotFound kind.
    let bogus = json!({ "id": "nope", "premium": 1.0 });
    let (status, body) = send(&app, json_req("PUT", "/trades", Some(&token), &bogus)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFoundError");
}

#[tokio::test]
async fn failed_sweep_commit_is_a_500_sweep_failed_error() {
    let (app, store) = test_app();
    let token = auth::create_jwt("u1", SECRET).unwrap();
    let create = json!({
        "symbol": "MSFT",
        "type": "put",
        "strike": 300.0,
        "expiration": "2020-01-17",
        "premium": 3.2,
    });
    let (status, _) = send(&app, json_req("POST", "/trades", Some(&token), &create)).await;
    assert_eq!(status, StatusCode::OK);

    store.fail_next_batch();
    let (status, body) = send(
        &app,
        json_req("POST", "/expired-trades/close", None, &Value::Null),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "SweepFailedError");
    assert!(body["details"].as_str().is_some());

    // Nothing was applied; the next run picks the trade up again.
    let (status, body) = send(
        &app,
        json_req("POST", "/expired-trades/close", None, &Value::Null),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["closedCount"], 1);

    let (status, dry) = send(&app, get("/expired-trades")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dry["expiredCount"], 0);
    assert_eq!(dry["message"], "No expired trades found");
}
