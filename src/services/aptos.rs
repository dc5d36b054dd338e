//! Aptos node REST client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::time::Instant;

use crate::{
    config::ChainConfig,
    error::{AppError, AppResult},
    models::{RawViewResult, TransactionHash, ViewRequest},
    services::chain::ChainClient,
};

/// Error body returned by the node
#[derive(Debug, Deserialize)]
struct NodeError {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

/// The parts of a transaction we look at while waiting
#[derive(Debug, Deserialize)]
struct TransactionStatus {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
}

impl TransactionStatus {
    fn is_pending(&self) -> bool {
        self.kind == "pending_transaction"
    }

    fn into_result(self, hash: &TransactionHash) -> AppResult<()> {
        match self.success {
            Some(false) => Err(AppError::ChainRpc(format!(
                "Transaction {} failed: {}",
                hash,
                self.vm_status.unwrap_or_else(|| "unknown VM status".to_string())
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Clone)]
pub struct AptosClient {
    http: reqwest::Client,
    node_url: String,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl AptosClient {
    pub fn new(config: &ChainConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            node_url: config.node_url.trim_end_matches('/').to_string(),
            wait_timeout: config.wait_timeout(),
            poll_interval: config.poll_interval(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.node_url, path)
    }

    async fn node_error(context: &str, response: reqwest::Response) -> AppError {
        let status = response.status();
        match response.json::<NodeError>().await {
            Ok(body) => AppError::ChainRpc(format!(
                "{} failed ({}{}): {}",
                context,
                status,
                body.error_code.map(|c| format!(", {}", c)).unwrap_or_default(),
                body.message
            )),
            Err(_) => AppError::ChainRpc(format!("{} failed ({})", context, status)),
        }
    }

    /// `None` while the node does not know the hash yet
    async fn transaction_status(&self, hash: &TransactionHash) -> AppResult<Option<TransactionStatus>> {
        let response = self
            .http
            .get(self.endpoint(&format!("transactions/by_hash/{}", hash)))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::ChainTimeout(hash.to_string())
                } else {
                    e.into()
                }
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::node_error("Transaction lookup", response).await);
        }
        Ok(Some(response.json().await?))
    }

    /// Server-side long poll; any failure just falls back to polling
    async fn long_poll(&self, hash: &TransactionHash) -> Option<TransactionStatus> {
        let response = self
            .http
            .get(self.endpoint(&format!("transactions/wait_by_hash/{}", hash)))
            .timeout(self.wait_timeout)
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => r.json().await.ok(),
            Ok(r) => {
                tracing::debug!(hash = %hash, status = %r.status(), "Long poll unavailable, polling instead");
                None
            }
            Err(e) => {
                tracing::debug!(hash = %hash, error = %e, "Long poll failed, polling instead");
                None
            }
        }
    }
}

#[async_trait]
impl ChainClient for AptosClient {
    async fn view(&self, request: &ViewRequest) -> AppResult<RawViewResult> {
        let payload = request.to_wire();
        tracing::debug!(function = %payload.function, "View call");

        let response = self
            .http
            .post(self.endpoint("view"))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::node_error(&format!("View {}", payload.function), response).await);
        }
        Ok(response.json().await?)
    }

    async fn wait_for_transaction(&self, hash: &TransactionHash) -> AppResult<()> {
        let deadline = Instant::now() + self.wait_timeout;

        if let Some(status) = self.long_poll(hash).await {
            if !status.is_pending() {
                return status.into_result(hash);
            }
        }

        loop {
            if let Some(status) = self.transaction_status(hash).await? {
                if !status.is_pending() {
                    return status.into_result(hash);
                }
            }
            if Instant::now() >= deadline {
                return Err(AppError::ChainTimeout(hash.to_string()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
