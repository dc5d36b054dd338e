//! Wallet session types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-f]{1,64}$").expect("valid address regex"));

/// Account address on the ledger (`0x` followed by up to 64 hex digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "0x1")]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(raw: &str) -> AppResult<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        if ADDRESS_RE.is_match(&normalized) {
            Ok(WalletAddress(normalized))
        } else {
            Err(AppError::Validation(format!("Invalid account address: {}", raw)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = AppError;

    fn try_from(v: String) -> Result<Self, Self::Error> {
        WalletAddress::parse(&v)
    }
}

impl From<WalletAddress> for String {
    fn from(a: WalletAddress) -> Self {
        a.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque credential issued on connect; names the caller's wallet slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn generate() -> Self {
        SessionToken(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> AppResult<Self> {
        Uuid::parse_str(raw.trim())
            .map(SessionToken)
            .map_err(|_| AppError::Authentication("Invalid session token".to_string()))
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connected wallet, as remembered between requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WalletSession {
    pub address: WalletAddress,
}
