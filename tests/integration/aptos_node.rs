//! `AptosClient` against a fake node served on a local port

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use library_portal::{
    config::ChainConfig,
    models::{ModuleId, TransactionHash, ViewFunction, ViewRequest, WalletAddress},
    services::{aptos::AptosClient, chain::ChainClient},
    AppError,
};

/// How many lookups each hash has seen
type Lookups = Arc<Mutex<HashMap<String, usize>>>;

async fn view(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let function = body["function"].as_str().unwrap_or_default().to_string();
    if function.contains("::slow::") {
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        (StatusCode::OK, Json(json!([[]])))
    } else if function.contains("::missing::") {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "function not found", "error_code": "invalid_input"})),
        )
    } else if function.ends_with("::get_all_books") {
        (StatusCode::OK, Json(json!([[{"id": "1", "status": "available"}]])))
    } else if function.ends_with("::get_user_data") {
        // echo the user argument back so the test can check it was sent
        let user = body["arguments"][1].clone();
        (StatusCode::OK, Json(json!([[user], []])))
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({"message": "unknown function"})))
    }
}

async fn wait_by_hash(Path(hash): Path<String>) -> (StatusCode, Json<Value>) {
    match hash.as_str() {
        "0xfeed" => (
            StatusCode::OK,
            Json(json!({"type": "user_transaction", "hash": hash, "success": true})),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({"message": "long poll disabled"}))),
    }
}

async fn by_hash(State(lookups): State<Lookups>, Path(hash): Path<String>) -> (StatusCode, Json<Value>) {
    let seen = {
        let mut lookups = lookups.lock().unwrap();
        let count = lookups.entry(hash.clone()).or_insert(0);
        *count += 1;
        *count
    };

    match hash.as_str() {
        // pending twice, then committed
        "0xabc" if seen <= 2 => (StatusCode::OK, Json(json!({"type": "pending_transaction", "hash": hash}))),
        "0xabc" => (
            StatusCode::OK,
            Json(json!({"type": "user_transaction", "hash": hash, "success": true, "vm_status": "Executed successfully"})),
        ),
        "0xbad" => (
            StatusCode::OK,
            Json(json!({"type": "user_transaction", "hash": hash, "success": false, "vm_status": "Move abort in 0xcafe::library: E_NOT_AVAILABLE"})),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({"message": "transaction not found"}))),
    }
}

async fn spawn_node() -> (String, Lookups) {
    let lookups: Lookups = Arc::default();
    let app = Router::new()
        .route("/v1/view", post(view))
        .route("/v1/transactions/wait_by_hash/:hash", get(wait_by_hash))
        .route("/v1/transactions/by_hash/:hash", get(by_hash))
        .with_state(lookups.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), lookups)
}

async fn client() -> (AptosClient, ModuleId, Lookups) {
    let (node_url, lookups) = spawn_node().await;
    let config = ChainConfig {
        node_url,
        contract_address: "0xcafe".to_string(),
        wait_timeout_secs: 1,
        poll_interval_ms: 20,
        request_timeout_secs: 1,
        ..ChainConfig::default()
    };
    let module = config.module().unwrap();
    (AptosClient::new(&config).unwrap(), module, lookups)
}

fn hash(s: &str) -> TransactionHash {
    TransactionHash::parse(s).unwrap()
}

#[tokio::test]
async fn test_view_get_all_books() {
    let (client, module, _) = client().await;
    let result = client
        .view(&ViewRequest::new(module, ViewFunction::GetAllBooks))
        .await
        .unwrap();
    assert_eq!(result, vec![json!([{"id": "1", "status": "available"}])]);
}

#[tokio::test]
async fn test_view_sends_user_argument() {
    let (client, module, _) = client().await;
    let user = WalletAddress::parse("0xa11ce").unwrap();
    let result = client
        .view(&ViewRequest::new(module, ViewFunction::GetUserData { user }))
        .await
        .unwrap();
    assert_eq!(result, vec![json!(["0xa11ce"]), json!([])]);
}

#[tokio::test]
async fn test_view_error_is_rpc_error() {
    let (client, _, _) = client().await;
    let module = ModuleId::new(WalletAddress::parse("0xcafe").unwrap(), "missing").unwrap();
    let err = client
        .view(&ViewRequest::new(module, ViewFunction::GetAllBooks))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ChainRpc(msg) if msg.contains("invalid_input") && msg.contains("function not found")));
}

#[tokio::test]
async fn test_view_timeout_is_rpc_error() {
    let (client, _, _) = client().await;
    let module = ModuleId::new(WalletAddress::parse("0xcafe").unwrap(), "slow").unwrap();
    let err = client
        .view(&ViewRequest::new(module, ViewFunction::GetAllBooks))
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::ChainRpc(msg) if msg.contains("timed out") && msg.contains("/v1/view")));
    assert!(!err.notice().starts_with("Transaction"));
}

#[tokio::test]
async fn test_wait_uses_long_poll_when_available() {
    let (client, _, lookups) = client().await;
    client.wait_for_transaction(&hash("0xfeed")).await.unwrap();
    assert!(lookups.lock().unwrap().get("0xfeed").is_none());
}

#[tokio::test]
async fn test_wait_polls_until_committed() {
    let (client, _, lookups) = client().await;
    client.wait_for_transaction(&hash("0xabc")).await.unwrap();
    assert_eq!(lookups.lock().unwrap().get("0xabc"), Some(&3));
}

#[tokio::test]
async fn test_wait_reports_aborted_transaction() {
    let (client, _, _) = client().await;
    let err = client.wait_for_transaction(&hash("0xbad")).await.unwrap_err();
    assert!(matches!(err, AppError::ChainRpc(msg) if msg.contains("E_NOT_AVAILABLE")));
}

#[tokio::test]
async fn test_wait_times_out() {
    let (client, _, _) = client().await;
    let err = client.wait_for_transaction(&hash("0x404")).await.unwrap_err();
    assert!(matches!(err, AppError::ChainTimeout(h) if h == "0x404"));
}
