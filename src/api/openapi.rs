//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{catalog, chain, health, session};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Portal API",
        version = "0.1.0",
        description = "Wallet-gated digital library dashboard",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Session
        session::connect,
        session::disconnect,
        session::get_session,
        session::resolve_route,
        // Catalog
        catalog::dashboard,
        catalog::search_books,
        // Chain
        chain::list_books,
        chain::get_user_data,
        chain::get_payload,
        chain::borrow_book,
        chain::return_book,
    ),
    components(
        schemas(
            // Models
            crate::models::Book,
            crate::models::BookId,
            crate::models::BookStatus,
            crate::models::Severity,
            crate::models::StatusBadge,
            crate::models::WalletAddress,
            crate::models::WalletSession,
            crate::models::SessionToken,
            crate::models::TransactionHash,
            crate::models::UserData,
            crate::models::payload::EntryFunctionPayload,
            crate::services::session::Route,
            crate::services::catalog::BookAction,
            crate::services::catalog::BookCard,
            crate::services::catalog::Dashboard,
            crate::services::catalog::DashboardSection,
            crate::services::catalog::SearchView,
            // Session
            session::ConnectRequest,
            session::ConnectResponse,
            session::DisconnectRequest,
            session::DisconnectResponse,
            session::RouteResponse,
            // Chain
            chain::ChainBook,
            chain::ChainBooksResponse,
            chain::Operation,
            chain::TransactionRequest,
            chain::TransactionResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Wallet session and navigation"),
        (name = "catalog", description = "Dashboard and catalog search"),
        (name = "chain", description = "Library module on the ledger")
    )
)]
pub struct ApiDoc;

/// Session token issued by `/session/connect`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
