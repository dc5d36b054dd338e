//! Library Portal
//!
//! Backend of a wallet-gated digital library dashboard: catalog search and
//! status badges, a wallet session gate, and a gateway to the library module
//! deployed on an Aptos ledger.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
