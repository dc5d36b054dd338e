//! In-process tests of the HTTP surface

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use library_portal::{
    api,
    config::{AppConfig, ChainConfig, LoggingConfig, ServerConfig, SessionConfig},
    models::{RawViewResult, TransactionHash, ViewFunction, ViewRequest},
    services::{chain::ChainClient, session::MemorySessionStore, Services},
    AppError, AppResult, AppState,
};

/// Ledger stand-in: canned view results, `0xdead` never finalizes
struct FakeChain;

#[async_trait]
impl ChainClient for FakeChain {
    async fn view(&self, request: &ViewRequest) -> AppResult<RawViewResult> {
        match &request.function {
            ViewFunction::GetAllBooks => Ok(vec![json!([
                {"id": "1", "title": "Clean Code", "status": "available"},
                {"id": "2", "title": "Lost Scroll", "status": "misplaced"}
            ])]),
            ViewFunction::GetUserData { user } if user.as_str() == "0xbad" => Ok(vec![json!([])]),
            ViewFunction::GetUserData { .. } => Ok(vec![json!(["book1"]), json!(["book2", "book3"])]),
        }
    }

    async fn wait_for_transaction(&self, hash: &TransactionHash) -> AppResult<()> {
        if hash.as_str() == "0xdead" {
            return Err(AppError::ChainTimeout(hash.to_string()));
        }
        Ok(())
    }
}

fn app() -> Router {
    let chain = ChainConfig {
        contract_address: "0xcafe".to_string(),
        ..ChainConfig::default()
    };
    let services = Services::new(&chain, Arc::new(MemorySessionStore::new()), Arc::new(FakeChain)).unwrap();
    let config = AppConfig {
        server: ServerConfig::default(),
        chain,
        session: SessionConfig::default(),
        logging: LoggingConfig::default(),
    };
    api::create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_as(app, None, method, uri, body).await
}

/// Like `send`, presenting `token` as the session credential
async fn send_as(
    app: &Router,
    token: Option<&str>,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Connect a wallet and return the issued session token
async fn connect(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/session/connect",
        Some(json!({"installed": true, "connected": false, "address": "0xA11CE"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_connect_without_wallet() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/session/connect",
        Some(json!({"installed": false})),
    )
    .await;

    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(body["error"], "WalletUnavailable");
    assert_eq!(body["message"], "Petra Wallet not found. Please install it.");

    let (status, _) = send(&app, Method::GET, "/api/v1/session", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_is_gated_by_session() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/session/connect",
        Some(json!({"installed": true, "connected": true, "address": "0xA11CE"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/dashboard");
    assert_eq!(body["session"]["address"], "0xa11ce");
    let token = body["token"].as_str().unwrap();

    let (status, body) = send_as(&app, Some(token), Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["address"], "0xa11ce");
    assert_eq!(body["borrowed"]["count"], 2);
    assert_eq!(body["borrowed"]["books"][0]["badge"]["label"], "Borrowed");
    assert_eq!(body["borrowed"]["books"][0]["badge"]["severity"], "warm");
    assert_eq!(body["recommended"]["books"][2]["action"], "Join Waitlist");
}

#[tokio::test]
async fn test_other_clients_do_not_share_the_session() {
    let app = app();
    let token = connect(&app).await;

    // no credential
    let (status, _) = send(&app, Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/chain/borrow",
        Some(json!({"book_id": 7, "hash": "0xabc"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, Method::GET, "/api/v1/session", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // a token that was never issued
    let stranger = "67e55044-10b1-426f-9247-bb680e5fe0c8";
    let (status, _) = send_as(&app, Some(stranger), Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // malformed header
    let (status, _) = send_as(&app, Some("0xa11ce"), Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_as(&app, Some(&token), Method::GET, "/api/v1/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], "0xa11ce");
}

#[tokio::test]
async fn test_disconnect_redirects_even_on_failure() {
    let app = app();
    let token = connect(&app).await;

    let (status, body) = send_as(
        &app,
        Some(&token),
        Method::POST,
        "/api/v1/session/disconnect",
        Some(json!({"installed": true, "fail_reason": "extension crashed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["redirect"], "/");
    assert!(body["notice"].as_str().unwrap().starts_with("Failed to disconnect wallet."));

    let (status, _) = send_as(&app, Some(&token), Method::GET, "/api/v1/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_search() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/books/search", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["results"].is_null());

    let (_, body) = send(&app, Method::GET, "/api/v1/books/search?q=clean", None).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["book"]["title"], "Clean Code");
    assert_eq!(results[0]["badge"]["primary"], true);

    let (_, body) = send(&app, Method::GET, "/api/v1/books/search?q=martin", None).await;
    assert_eq!(body["results"][0]["book"]["author"], "Robert C. Martin");

    let (_, body) = send(&app, Method::GET, "/api/v1/books/search?q=xyz", None).await;
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_route_resolution() {
    let app = app();
    let (_, body) = send(&app, Method::GET, "/api/v1/routes/resolve?path=/dashboard", None).await;
    assert_eq!(body["route"], "dashboard");
    assert_eq!(body["requires_session"], true);
    assert_eq!(body["session_active"], false);

    let (_, body) = send(&app, Method::GET, "/api/v1/routes/resolve?path=/shelves", None).await;
    assert_eq!(body["route"], "not_found");

    let token = connect(&app).await;
    let (_, body) = send_as(&app, Some(&token), Method::GET, "/api/v1/routes/resolve?path=/dashboard", None).await;
    assert_eq!(body["session_active"], true);
}

#[tokio::test]
async fn test_unknown_endpoint_is_json_404() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchData");
}

#[tokio::test]
async fn test_chain_views() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/chain/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"][0]["badge"]["label"], "Available");
    assert!(body["books"][1]["badge"].is_null());

    let (status, body) = send(&app, Method::GET, "/api/v1/chain/users/0xa11ce", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"borrowed": ["book1"], "returned": ["book2", "book3"]}));

    let (status, body) = send(&app, Method::GET, "/api/v1/chain/users/0xbad", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "UnexpectedShape");

    let (status, _) = send(&app, Method::GET, "/api/v1/chain/users/alice", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payload_for_wallet() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/chain/payloads/borrow/42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "type": "entry_function_payload",
            "function": "0xcafe::library::borrow_book",
            "type_arguments": [],
            "arguments": ["0xcafe", "42"]
        })
    );
}

#[tokio::test]
async fn test_borrow_and_return() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/chain/borrow",
        Some(json!({"book_id": 42, "hash": "0xabc"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = connect(&app).await;
    let token = Some(token.as_str());

    let (status, body) = send_as(
        &app,
        token,
        Method::POST,
        "/api/v1/chain/borrow",
        Some(json!({"book_id": 42, "hash": "0xabc"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"book_id": 42, "hash": "0xabc"}));

    let (status, body) = send_as(
        &app,
        token,
        Method::POST,
        "/api/v1/chain/return",
        Some(json!({"book_id": 42, "rejection": "User rejected the request"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "User rejected the request");

    let (status, body) = send_as(
        &app,
        token,
        Method::POST,
        "/api/v1/chain/return",
        Some(json!({"book_id": 42, "hash": "0xdead"})),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "ChainTimeout");
}
