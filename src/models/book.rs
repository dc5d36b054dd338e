//! Book records shown on the dashboard.
//!
//! A book's optional dates and rating depend on its status: a due date only
//! exists while the book is borrowed, and a return date or reader rating only
//! once it has been returned. The per-status constructors uphold this, and
//! [`Book::validate`] checks records that arrive from elsewhere.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Book identifier, as used by the ledger module (`u64`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BookId {
    fn from(v: u64) -> Self {
        BookId(v)
    }
}

// ---------------------------------------------------------------------------
// BookStatus
// ---------------------------------------------------------------------------

/// Circulation status of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Borrowed,
    Returned,
    Available,
    Unavailable,
}

impl BookStatus {
    pub const ALL: [BookStatus; 4] = [
        BookStatus::Borrowed,
        BookStatus::Returned,
        BookStatus::Available,
        BookStatus::Unavailable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Borrowed => "borrowed",
            BookStatus::Returned => "returned",
            BookStatus::Available => "available",
            BookStatus::Unavailable => "unavailable",
        }
    }
}

impl FromStr for BookStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(BookStatus::Borrowed),
            "returned" => Ok(BookStatus::Returned),
            "available" => Ok(BookStatus::Available),
            "unavailable" => Ok(BookStatus::Unavailable),
            other => Err(AppError::Validation(format!("Unknown book status: {}", other))),
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// Reader rating, 1 to 5 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> AppResult<Self> {
        if (1..=Self::MAX).contains(&stars) {
            Ok(Rating(stars))
        } else {
            Err(AppError::Validation(format!(
                "Rating must be between 1 and {}, got {}",
                Self::MAX,
                stars
            )))
        }
    }

    pub fn stars(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = AppError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Rating::new(v)
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> Self {
        r.0
    }
}

// ---------------------------------------------------------------------------
// Book
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub category: String,
    /// Cover glyph shown next to the title
    pub image: String,
    pub status: BookStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<u8>, minimum = 1, maximum = 5)]
    pub rating: Option<Rating>,
}

impl Book {
    fn base(id: u64, title: &str, author: &str, category: &str, image: &str, status: BookStatus) -> Self {
        Self {
            id: BookId(id),
            title: title.to_string(),
            author: author.to_string(),
            category: category.to_string(),
            image: image.to_string(),
            status,
            due_date: None,
            return_date: None,
            rating: None,
        }
    }

    pub fn borrowed(id: u64, title: &str, author: &str, category: &str, image: &str, due_date: NaiveDate) -> Self {
        Self {
            due_date: Some(due_date),
            ..Self::base(id, title, author, category, image, BookStatus::Borrowed)
        }
    }

    pub fn returned(
        id: u64,
        title: &str,
        author: &str,
        category: &str,
        image: &str,
        return_date: NaiveDate,
        rating: Option<Rating>,
    ) -> Self {
        Self {
            return_date: Some(return_date),
            rating,
            ..Self::base(id, title, author, category, image, BookStatus::Returned)
        }
    }

    pub fn available(id: u64, title: &str, author: &str, category: &str, image: &str) -> Self {
        Self::base(id, title, author, category, image, BookStatus::Available)
    }

    pub fn unavailable(id: u64, title: &str, author: &str, category: &str, image: &str) -> Self {
        Self::base(id, title, author, category, image, BookStatus::Unavailable)
    }

    /// Check that dates and rating match the status
    pub fn validate(&self) -> AppResult<()> {
        if self.due_date.is_some() && self.status != BookStatus::Borrowed {
            return Err(AppError::Validation(format!(
                "Book {} has a due date but is {}",
                self.id, self.status
            )));
        }
        if self.status != BookStatus::Returned {
            if self.return_date.is_some() {
                return Err(AppError::Validation(format!(
                    "Book {} has a return date but is {}",
                    self.id, self.status
                )));
            }
            if self.rating.is_some() {
                return Err(AppError::Validation(format!(
                    "Book {} has a rating but is {}",
                    self.id, self.status
                )));
            }
        }
        Ok(())
    }
}
