//! Dashboard and catalog search endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::services::catalog::{Dashboard, SearchView};

use super::ActiveSession;

#[derive(Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Text matched against title, author and category
    #[serde(default)]
    pub q: String,
}

/// Dashboard of the connected wallet
#[utoipa::path(
    get,
    path = "/dashboard",
    security(("bearer_auth" = [])),
    tag = "catalog",
    responses(
        (status = 200, description = "Dashboard sections", body = Dashboard),
        (status = 401, description = "No wallet connected", body = crate::error::ErrorResponse)
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    ActiveSession(session): ActiveSession,
) -> Json<Dashboard> {
    Json(state.services.catalog.dashboard(session))
}

/// Search the catalog; an empty query yields no result list
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "catalog",
    params(SearchQuery),
    responses(
        (status = 200, description = "Search results", body = SearchView)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchView> {
    Json(state.services.catalog.search_results(&query.q))
}
