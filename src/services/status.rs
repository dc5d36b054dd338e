//! Status badge classification

use crate::models::{BookStatus, Severity, StatusBadge};

/// Badge for a known status
pub fn classify(status: BookStatus) -> StatusBadge {
    match status {
        BookStatus::Borrowed => StatusBadge {
            label: "Borrowed",
            severity: Severity::Warm,
            primary: false,
            icon: Some("clock"),
        },
        BookStatus::Returned => StatusBadge {
            label: "Returned",
            severity: Severity::Positive,
            primary: false,
            icon: Some("check-circle"),
        },
        BookStatus::Available => StatusBadge {
            label: "Available",
            severity: Severity::Positive,
            primary: true,
            icon: None,
        },
        BookStatus::Unavailable => StatusBadge {
            label: "Unavailable",
            severity: Severity::Negative,
            primary: false,
            icon: Some("alert-circle"),
        },
    }
}

/// Badge for a status string coming from outside the catalog.
///
/// Unrecognized statuses get no badge at all; the book is still listed.
pub fn classify_raw(status: &str) -> Option<StatusBadge> {
    match status.parse::<BookStatus>() {
        Ok(status) => Some(classify(status)),
        Err(_) => {
            tracing::debug!(status, "No badge for unrecognized book status");
            None
        }
    }
}
