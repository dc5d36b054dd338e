//! Data models for the library portal

pub mod book;
pub mod chain;
pub mod payload;
pub mod session;
pub mod status;

// Re-export commonly used types
pub use book::{Book, BookId, BookStatus, Rating};
pub use chain::{PendingTransaction, RawViewResult, TransactionHash, UserData};
pub use payload::{EntryFunction, ModuleId, TransactionPayload, ViewFunction, ViewRequest};
pub use session::{SessionToken, WalletAddress, WalletSession};
pub use status::{Severity, StatusBadge};
