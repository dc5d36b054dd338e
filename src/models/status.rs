//! Display classification for book statuses

use serde::Serialize;
use utoipa::ToSchema;

/// Styling tier of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Neutral,
    Warm,
    Positive,
    Negative,
}

/// Badge rendered next to a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusBadge {
    #[schema(value_type = String)]
    pub label: &'static str,
    pub severity: Severity,
    /// Rendered with the primary colour instead of the severity tint
    pub primary: bool,
    #[schema(value_type = Option<String>)]
    pub icon: Option<&'static str>,
}
