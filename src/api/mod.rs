//! API handlers for the library portal REST endpoints

pub mod catalog;
pub mod chain;
pub mod health;
pub mod openapi;
pub mod session;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Uri},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::{SessionToken, WalletSession},
    AppState,
};

/// Session token from `Authorization: Bearer <token>`, if the caller sent one
pub struct SessionCredential(pub Option<SessionToken>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionCredential {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(SessionCredential(None));
        };

        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        Ok(SessionCredential(Some(SessionToken::parse(token)?)))
    }
}

/// Extractor for routes that need a connected wallet
pub struct ActiveSession(pub WalletSession);

#[async_trait]
impl FromRequestParts<AppState> for ActiveSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let SessionCredential(token) = SessionCredential::from_request_parts(parts, state).await?;
        let session = state.services.session.authorize(token.as_ref()).await?;
        Ok(ActiveSession(session))
    }
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Navigation and wallet session
        .route("/routes/resolve", get(session::resolve_route))
        .route("/session", get(session::get_session))
        .route("/session/connect", post(session::connect))
        .route("/session/disconnect", post(session::disconnect))
        // Catalog
        .route("/dashboard", get(catalog::dashboard))
        .route("/books/search", get(catalog::search_books))
        // Ledger
        .route("/chain/books", get(chain::list_books))
        .route("/chain/users/:address", get(chain::get_user_data))
        .route("/chain/payloads/:operation/:book_id", get(chain::get_payload))
        .route("/chain/borrow", post(chain::borrow_book))
        .route("/chain/return", post(chain::return_book))
        .fallback(not_found)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
