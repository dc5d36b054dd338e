//! Error types for the library portal

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes returned to the dashboard alongside the HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    WalletUnavailable = 3,
    SigningRejected = 4,
    ChainTimeout = 5,
    ChainFailure = 6,
    UnexpectedShape = 7,
    DisconnectFailure = 8,
    BadValue = 9,
    Busy = 10,
    NoSuchData = 11,
    StoreFailure = 12,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Timed out waiting for transaction {0}")]
    ChainTimeout(String),

    #[error("Chain RPC error: {0}")]
    ChainRpc(String),

    #[error("Unexpected view result: {0}")]
    UnexpectedShape(String),

    #[error("Disconnect failed: {0}")]
    Disconnect(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status, code and user-facing notice for this error
    fn parts(&self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::WalletUnavailable(msg) => (
                StatusCode::PRECONDITION_FAILED,
                ErrorCode::WalletUnavailable,
                msg.clone(),
            ),
            AppError::Signing(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::SigningRejected,
                msg.clone(),
            ),
            AppError::ChainTimeout(hash) => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorCode::ChainTimeout,
                format!("Transaction {} was not confirmed in time", hash),
            ),
            AppError::ChainRpc(msg) => {
                (StatusCode::BAD_GATEWAY, ErrorCode::ChainFailure, msg.clone())
            }
            AppError::UnexpectedShape(msg) => {
                (StatusCode::BAD_GATEWAY, ErrorCode::UnexpectedShape, msg.clone())
            }
            AppError::Disconnect(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorCode::DisconnectFailure,
                msg.clone(),
            ),
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Busy, msg.clone()),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::Store(e) => {
                tracing::error!("Session store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::StoreFailure,
                    "Session store error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        }
    }

    /// Text shown to the user in the blocking notification
    pub fn notice(&self) -> String {
        self.parts().2
    }
}

/// Node request failures, timeouts included. Only the finality wait reports
/// `ChainTimeout`, since that variant names a transaction.
impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            let url = e.url().map(|u| u.to_string()).unwrap_or_default();
            AppError::ChainRpc(format!("Request to {} timed out", url))
        } else {
            AppError::ChainRpc(e.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
