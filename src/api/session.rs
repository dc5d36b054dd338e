//! Wallet session and navigation endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{SessionToken, WalletSession},
    services::session::{ReportedWallet, Route, WalletProvider},
};

use super::SessionCredential;

/// Wallet state as seen by the browser extension
#[derive(Deserialize, ToSchema, Validate)]
pub struct ConnectRequest {
    /// Whether the wallet extension is installed
    pub installed: bool,
    /// Whether the extension already trusts this site
    #[serde(default)]
    pub connected: bool,
    /// Account address reported after approval
    #[validate(length(min = 3, max = 66))]
    pub address: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ConnectResponse {
    /// Send back as `Authorization: Bearer <token>`
    pub token: SessionToken,
    pub session: WalletSession,
    /// Where the dashboard should navigate next
    pub redirect: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DisconnectRequest {
    pub installed: bool,
    /// Error raised by the extension's disconnect, if any
    pub fail_reason: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DisconnectResponse {
    pub success: bool,
    /// Message to show the user
    pub notice: String,
    pub redirect: String,
}

#[derive(Deserialize, IntoParams)]
pub struct RouteQuery {
    /// Path to resolve, e.g. `/dashboard`
    pub path: String,
}

#[derive(Serialize, ToSchema)]
pub struct RouteResponse {
    pub route: Route,
    pub path: String,
    pub requires_session: bool,
    /// Whether a wallet session is currently held
    pub session_active: bool,
}

/// Connect the wallet and remember its address
#[utoipa::path(
    post,
    path = "/session/connect",
    tag = "session",
    request_body = ConnectRequest,
    responses(
        (status = 200, description = "Wallet connected", body = ConnectResponse),
        (status = 401, description = "Connection not approved", body = crate::error::ErrorResponse),
        (status = 412, description = "Wallet extension not installed", body = crate::error::ErrorResponse)
    )
)]
pub async fn connect(
    State(state): State<crate::AppState>,
    Json(request): Json<ConnectRequest>,
) -> AppResult<Json<ConnectResponse>> {
    request.validate()?;

    let wallet = request.installed.then(|| ReportedWallet {
        connected: request.connected,
        address: request.address.clone(),
        disconnect_failure: None,
    });

    let connected = state
        .services
        .session
        .connect(wallet.as_ref().map(|w| w as &dyn WalletProvider))
        .await?;

    Ok(Json(ConnectResponse {
        token: connected.token,
        session: connected.session,
        redirect: connected.redirect.path().to_string(),
    }))
}

/// Disconnect the wallet; always redirects to the landing page
#[utoipa::path(
    post,
    path = "/session/disconnect",
    security(("bearer_auth" = [])),
    tag = "session",
    request_body = DisconnectRequest,
    responses(
        (status = 200, description = "Disconnect attempted", body = DisconnectResponse)
    )
)]
pub async fn disconnect(
    State(state): State<crate::AppState>,
    SessionCredential(token): SessionCredential,
    Json(request): Json<DisconnectRequest>,
) -> Json<DisconnectResponse> {
    let wallet = request.installed.then(|| ReportedWallet {
        connected: true,
        address: None,
        disconnect_failure: request.fail_reason.clone(),
    });

    let out = state
        .services
        .session
        .disconnect(token.as_ref(), wallet.as_ref().map(|w| w as &dyn WalletProvider))
        .await;

    let (success, notice) = match out.error {
        None => (true, "Wallet disconnected successfully.".to_string()),
        Some(e) => (false, format!("Failed to disconnect wallet. {}", e.notice())),
    };

    Json(DisconnectResponse {
        success,
        notice,
        redirect: out.redirect.path().to_string(),
    })
}

/// Currently connected wallet
#[utoipa::path(
    get,
    path = "/session",
    security(("bearer_auth" = [])),
    tag = "session",
    responses(
        (status = 200, description = "Connected wallet", body = WalletSession),
        (status = 404, description = "No wallet connected", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_session(
    State(state): State<crate::AppState>,
    SessionCredential(token): SessionCredential,
) -> AppResult<Json<WalletSession>> {
    let session = match token {
        Some(token) => state.services.session.current(&token).await?,
        None => None,
    };
    session
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No wallet connected".to_string()))
}

/// Resolve a dashboard path to its route
#[utoipa::path(
    get,
    path = "/routes/resolve",
    tag = "session",
    params(RouteQuery),
    responses(
        (status = 200, description = "Resolved route", body = RouteResponse)
    )
)]
pub async fn resolve_route(
    State(state): State<crate::AppState>,
    SessionCredential(token): SessionCredential,
    Query(query): Query<RouteQuery>,
) -> AppResult<Json<RouteResponse>> {
    let route = Route::resolve(&query.path);
    let session = match token {
        Some(token) => state.services.session.current(&token).await?,
        None => None,
    };

    Ok(Json(RouteResponse {
        route,
        path: query.path,
        requires_session: route.requires_session(),
        session_active: session.is_some(),
    }))
}
