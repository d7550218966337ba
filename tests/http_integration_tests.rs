use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use transact::cache::memory::MemoryBalanceCache;
use transact::coordinator::TransactionCoordinator;
use transact::domain::Currency;
use transact::http::{build_router, AppState};
use transact::ledger_gateway::memory::MemoryLedgerGateway;
use transact::lock::memory::MemoryLock;
use transact::store::memory::MemoryAccountStore;
use transact::user::memory::MemoryUserStore;
use transact::user::UserService;

async fn test_app() -> axum::Router {
    let ledger = Arc::new(MemoryLedgerGateway::new());
    let store = Arc::new(MemoryAccountStore::new());
    let cache = Arc::new(MemoryBalanceCache::new());
    let lock = Arc::new(MemoryLock::new());

    let coordinator = Arc::new(TransactionCoordinator::new(ledger, store, cache, lock));
    coordinator.bootstrap_system_accounts(&Currency::all()).await.unwrap();

    let users = Arc::new(UserService::new(Arc::new(MemoryUserStore::new())));

    build_router(AppState { coordinator, users })
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, api_key: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(key) = api_key {
        builder = builder.header("X-API-KEY", key);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, api_key: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("X-API-KEY", api_key)
        .body(Body::empty())
        .unwrap()
}

async fn register_user(app: &axum::Router, name: &str, email: &str) -> (String, String) {
    let req = json_request("POST", "/api/v1/users", None, json!({ "name": name, "email": email }));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    let data = &body["data"];
    (
        data["id"].as_str().unwrap().to_string(),
        data["api_key"].as_str().unwrap().to_string(),
    )
}

async fn open_account(app: &axum::Router, api_key: &str, currency: &str) -> String {
    let req = json_request(
        "POST",
        "/api/v1/accounts",
        Some(api_key),
        json!({ "currency": currency }),
    );
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = test_app().await;
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn register_and_fetch_user() {
    let app = test_app().await;
    let (user_id, api_key) = register_user(&app, "Ada", "ada@example.com").await;

    let req = get_request(&format!("/api/v1/users/{user_id}"), &api_key);
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "ada@example.com");
}

#[tokio::test]
async fn duplicate_email_registration_conflicts() {
    let app = test_app().await;
    register_user(&app, "Ada", "dup@example.com").await;

    let req = json_request(
        "POST",
        "/api/v1/users",
        None,
        json!({ "name": "Ada Two", "email": "dup@example.com" }),
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "email_already_exists");
}

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let app = test_app().await;
    let req = Request::builder()
        .uri("/api/v1/accounts")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deposit_and_transfer_end_to_end() {
    let app = test_app().await;
    let (_user_id, api_key) = register_user(&app, "Grace", "grace@example.com").await;

    let account_a = open_account(&app, &api_key, "USD").await;
    let account_b = open_account(&app, &api_key, "USD").await;

    let deposit_req = json_request(
        "POST",
        &format!("/api/v1/accounts/{account_a}/deposit"),
        Some(&api_key),
        json!({ "amount": 10_000, "reference": "d1" }),
    );
    let (status, body) = send(&app, deposit_req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["new_balance"], 10_000);

    let transfer_req = json_request(
        "POST",
        "/api/v1/transfers",
        Some(&api_key),
        json!({
            "from_account_id": account_a,
            "to_account_id": account_b,
            "amount": 2_000,
            "reference": "t1",
        }),
    );
    let (status, body) = send(&app, transfer_req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["from_new_balance"], 8_000);
    assert_eq!(body["data"]["to_new_balance"], 2_000);

    let balance_req = get_request(&format!("/api/v1/accounts/{account_a}/balance"), &api_key);
    let (status, body) = send(&app, balance_req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["balance"], 8_000);
}

#[tokio::test]
async fn duplicate_deposit_reference_is_rejected() {
    let app = test_app().await;
    let (_user_id, api_key) = register_user(&app, "Ed", "ed@example.com").await;
    let account = open_account(&app, &api_key, "USD").await;

    let first = json_request(
        "POST",
        &format!("/api/v1/accounts/{account}/deposit"),
        Some(&api_key),
        json!({ "amount": 500, "reference": "only-once" }),
    );
    let (status, _) = send(&app, first).await;
    assert_eq!(status, StatusCode::OK);

    let second = json_request(
        "POST",
        &format!("/api/v1/accounts/{account}/deposit"),
        Some(&api_key),
        json!({ "amount": 500, "reference": "only-once" }),
    );
    let (status, body) = send(&app, second).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "duplicate_transaction");
}

#[tokio::test]
async fn same_account_transfer_is_rejected() {
    let app = test_app().await;
    let (_user_id, api_key) = register_user(&app, "Mae", "mae@example.com").await;
    let account = open_account(&app, &api_key, "USD").await;

    let req = json_request(
        "POST",
        "/api/v1/transfers",
        Some(&api_key),
        json!({
            "from_account_id": account,
            "to_account_id": account,
            "amount": 100,
            "reference": "t",
        }),
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "same_account");
}

#[tokio::test]
async fn currency_mismatch_transfer_is_rejected() {
    let app = test_app().await;
    let (_user_id, api_key) = register_user(&app, "Lin", "lin@example.com").await;
    let account_usd = open_account(&app, &api_key, "USD").await;
    let account_eur = open_account(&app, &api_key, "EUR").await;

    let req = json_request(
        "POST",
        "/api/v1/transfers",
        Some(&api_key),
        json!({
            "from_account_id": account_usd,
            "to_account_id": account_eur,
            "amount": 100,
            "reference": "t",
        }),
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "currency_mismatch");
}

#[tokio::test]
async fn transaction_listing_is_paginated() {
    let app = test_app().await;
    let (_user_id, api_key) = register_user(&app, "Kai", "kai@example.com").await;
    let account = open_account(&app, &api_key, "USD").await;

    for i in 0..3 {
        let req = json_request(
            "POST",
            &format!("/api/v1/accounts/{account}/deposit"),
            Some(&api_key),
            json!({ "amount": 100, "reference": format!("d{i}") }),
        );
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
    }

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/v1/accounts/{account}/transactions?limit=2"))
        .header("X-API-KEY", &api_key)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["has_more"], true);
}
