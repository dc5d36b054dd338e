//! Catalog search and dashboard composition

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{Book, BookStatus, Rating, StatusBadge, WalletSession},
    services::status::classify,
};

/// Books whose title, author or category contains `query`, ignoring case.
///
/// Catalog order is preserved. An empty query matches every book.
pub fn search<'a>(books: &'a [Book], query: &str) -> Vec<&'a Book> {
    let needle = query.to_lowercase();
    books
        .iter()
        .filter(|book| {
            book.title.to_lowercase().contains(&needle)
                || book.author.to_lowercase().contains(&needle)
                || book.category.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Dashboard sections, loaded once at startup
#[derive(Debug, Clone)]
pub struct Catalog {
    pub borrowed: Vec<Book>,
    pub returned: Vec<Book>,
    pub recommended: Vec<Book>,
    pub discover: Vec<Book>,
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn stars(n: u8) -> Option<Rating> {
    Rating::new(n).ok()
}

impl Catalog {
    pub fn seed() -> Self {
        Self {
            borrowed: vec![
                Book::borrowed(1, "Introduction to Computer Science", "David J. Malan", "Computer Science", "📚", ymd(2024, 8, 15)),
                Book::borrowed(2, "Calculus: Early Transcendentals", "James Stewart", "Mathematics", "📖", ymd(2024, 8, 20)),
            ],
            returned: vec![
                Book::returned(3, "The Art of War", "Sun Tzu", "Philosophy", "📜", ymd(2024, 7, 28), stars(5)),
                Book::returned(4, "Digital Design and Computer Architecture", "David Harris", "Computer Science", "💻", ymd(2024, 7, 25), stars(4)),
            ],
            recommended: vec![
                Book::available(5, "Clean Code", "Robert C. Martin", "Programming", "🔧"),
                Book::available(6, "Linear Algebra and Its Applications", "Gilbert Strang", "Mathematics", "📊"),
                Book::unavailable(7, "The Pragmatic Programmer", "David Thomas", "Programming", "🚀"),
            ],
            discover: vec![
                Book::available(8, "Data Structures and Algorithms", "Michael T. Goodrich", "Computer Science", "🗂️"),
                Book::available(9, "Operating System Concepts", "Abraham Silberschatz", "Computer Science", "⚙️"),
                Book::unavailable(10, "Machine Learning Yearning", "Andrew Ng", "AI/ML", "🤖"),
            ],
        }
    }

    /// Every book, section by section
    pub fn all(&self) -> Vec<Book> {
        self.borrowed
            .iter()
            .chain(&self.returned)
            .chain(&self.recommended)
            .chain(&self.discover)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// What the reader can do with a recommended book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum BookAction {
    #[serde(rename = "Borrow")]
    Borrow,
    #[serde(rename = "Join Waitlist")]
    JoinWaitlist,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookCard {
    pub book: Book,
    pub badge: StatusBadge,
    /// e.g. "Due: Aug 15, 2024"
    pub date_line: Option<String>,
    /// Five entries, filled stars first
    pub stars: Option<Vec<bool>>,
    pub action: Option<BookAction>,
}

impl BookCard {
    fn new(book: &Book) -> Self {
        let date_line = match book.status {
            BookStatus::Borrowed => book.due_date.map(|d| format!("Due: {}", format_date(d))),
            BookStatus::Returned => book.return_date.map(|d| format!("Returned: {}", format_date(d))),
            _ => None,
        };
        Self {
            book: book.clone(),
            badge: classify(book.status),
            date_line,
            stars: book.rating.map(star_strip),
            action: None,
        }
    }

    fn with_action(mut self) -> Self {
        self.action = Some(match self.book.status {
            BookStatus::Available => BookAction::Borrow,
            _ => BookAction::JoinWaitlist,
        });
        self
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSection {
    pub title: String,
    pub description: String,
    pub count: usize,
    pub books: Vec<BookCard>,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub session: WalletSession,
    pub borrowed: DashboardSection,
    pub returned: DashboardSection,
    pub recommended: DashboardSection,
}

/// Search box result; `results` is absent until the reader types something
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchView {
    pub query: String,
    pub results: Option<Vec<BookCard>>,
}

/// "Aug 15, 2024"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn star_strip(rating: Rating) -> Vec<bool> {
    (0..Rating::MAX).map(|i| i < rating.stars()).collect()
}

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<Catalog>,
}

impl CatalogService {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Search box contents for `query`
    pub fn search_results(&self, query: &str) -> SearchView {
        let results = if query.is_empty() {
            None
        } else {
            let books = self.catalog.all();
            Some(search(&books, query).into_iter().map(BookCard::new).collect())
        };
        SearchView {
            query: query.to_string(),
            results,
        }
    }

    /// Dashboard for a connected wallet
    pub fn dashboard(&self, session: WalletSession) -> Dashboard {
        let borrowed = &self.catalog.borrowed;
        let returned = &self.catalog.returned;
        let recommended = &self.catalog.recommended;

        Dashboard {
            session,
            borrowed: DashboardSection {
                title: format!("Borrowed Books ({})", borrowed.len()),
                description: "Currently checked out books with due dates".to_string(),
                count: borrowed.len(),
                books: borrowed.iter().map(BookCard::new).collect(),
                empty_message: borrowed.is_empty().then(|| "No borrowed books".to_string()),
            },
            returned: DashboardSection {
                title: format!("Recently Returned ({})", returned.len()),
                description: "Books you've returned with your ratings".to_string(),
                count: returned.len(),
                books: returned.iter().map(BookCard::new).collect(),
                empty_message: None,
            },
            recommended: DashboardSection {
                title: "Recommended for You".to_string(),
                description: "Curated book suggestions based on your reading history".to_string(),
                count: recommended.len(),
                books: recommended
                    .iter()
                    .map(|b| BookCard::new(b).with_action())
                    .collect(),
                empty_message: None,
            },
        }
    }
}
