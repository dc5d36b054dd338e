//! Wallet session gate.
//!
//! Connecting a wallet issues a [`SessionToken`] and stores the wallet's
//! address in that token's slot; the dashboard route is only served to a
//! caller presenting a token whose slot is set. Disconnecting always sends
//! the user back to the landing page, even when the wallet refuses.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{SessionToken, WalletAddress, WalletSession},
};

/// Storage key of the connected wallet's address
pub const WALLET_ADDRESS_KEY: &str = "wallet_address";

const WALLET_NOT_FOUND: &str = "Petra Wallet not found. Please install it.";
const CONNECT_FAILED: &str = "Failed to connect to Petra Wallet. Please try again.";

/// Account exposed by a wallet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalletAccount {
    pub address: String,
}

/// Browser wallet capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn is_connected(&self) -> AppResult<bool>;
    /// Interactive approval; may wait on the user indefinitely
    async fn connect(&self) -> AppResult<()>;
    async fn account(&self) -> AppResult<WalletAccount>;
    async fn disconnect(&self) -> AppResult<()>;
}

/// One `wallet_address` slot per session token
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, token: &SessionToken) -> AppResult<Option<String>>;
    async fn save(&self, token: &SessionToken, address: &str) -> AppResult<()>;
    async fn clear(&self, token: &SessionToken) -> AppResult<()>;
    /// Fails when the backing store is unreachable
    async fn ping(&self) -> AppResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slots: RwLock<HashMap<SessionToken, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, token: &SessionToken) -> AppResult<Option<String>> {
        Ok(self.slots.read().await.get(token).cloned())
    }

    async fn save(&self, token: &SessionToken, address: &str) -> AppResult<()> {
        self.slots.write().await.insert(*token, address.to_string());
        Ok(())
    }

    async fn clear(&self, token: &SessionToken) -> AppResult<()> {
        self.slots.write().await.remove(token);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Wallet state reported by the dashboard after talking to the extension
#[derive(Debug, Clone, Default)]
pub struct ReportedWallet {
    pub connected: bool,
    pub address: Option<String>,
    pub disconnect_failure: Option<String>,
}

#[async_trait]
impl WalletProvider for ReportedWallet {
    async fn is_connected(&self) -> AppResult<bool> {
        Ok(self.connected)
    }

    async fn connect(&self) -> AppResult<()> {
        // the approval popup already ran in the browser
        match self.address {
            Some(_) => Ok(()),
            None => Err(AppError::Authentication(
                "Wallet connection was not approved".to_string(),
            )),
        }
    }

    async fn account(&self) -> AppResult<WalletAccount> {
        self.address
            .clone()
            .map(|address| WalletAccount { address })
            .ok_or_else(|| AppError::Authentication("Wallet did not expose an account".to_string()))
    }

    async fn disconnect(&self) -> AppResult<()> {
        match &self.disconnect_failure {
            Some(reason) => Err(AppError::Disconnect(reason.clone())),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Landing,
    Dashboard,
    NotFound,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Dashboard => "/dashboard",
            Route::NotFound => "*",
        }
    }

    pub fn resolve(path: &str) -> Route {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Landing,
            "/dashboard" => Route::Dashboard,
            _ => Route::NotFound,
        }
    }

    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

/// Result of a successful connect
#[derive(Debug, Clone)]
pub struct Connected {
    /// Credential the caller presents on later requests
    pub token: SessionToken,
    pub session: WalletSession,
    pub redirect: Route,
}

/// Result of a disconnect; `error` is shown to the user but does not stop the redirect
#[derive(Debug)]
pub struct Disconnected {
    pub redirect: Route,
    pub error: Option<AppError>,
}

#[derive(Clone)]
pub struct SessionGate {
    store: Arc<dyn SessionStore>,
}

impl SessionGate {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Connect `wallet` (prompting for approval if needed) and remember its
    /// address under a freshly issued token
    pub async fn connect(&self, wallet: Option<&dyn WalletProvider>) -> AppResult<Connected> {
        let wallet = wallet.ok_or_else(|| AppError::WalletUnavailable(WALLET_NOT_FOUND.to_string()))?;

        let address = Self::approved_address(wallet).await.map_err(|e| {
            tracing::warn!(error = %e, "Wallet connection error");
            AppError::Authentication(CONNECT_FAILED.to_string())
        })?;

        let token = SessionToken::generate();
        self.store.save(&token, address.as_str()).await?;

        tracing::info!(address = %address, "Connected wallet");
        Ok(Connected {
            token,
            session: WalletSession { address },
            redirect: Route::Dashboard,
        })
    }

    async fn approved_address(wallet: &dyn WalletProvider) -> AppResult<WalletAddress> {
        if !wallet.is_connected().await? {
            wallet.connect().await?;
        }
        let account = wallet.account().await?;
        WalletAddress::parse(&account.address)
    }

    /// Disconnect `wallet` and forget the address stored under `token`
    pub async fn disconnect(
        &self,
        token: Option<&SessionToken>,
        wallet: Option<&dyn WalletProvider>,
    ) -> Disconnected {
        let wallet_result = match wallet {
            Some(wallet) => wallet.disconnect().await.map_err(|e| match e {
                AppError::Disconnect(_) => e,
                other => AppError::Disconnect(other.to_string()),
            }),
            None => Err(AppError::Disconnect(WALLET_NOT_FOUND.to_string())),
        };

        let store_result = match token {
            Some(token) => self.store.clear(token).await,
            None => Ok(()),
        };

        if let Err(e) = &wallet_result {
            tracing::error!(error = %e, "Failed to disconnect wallet");
        }
        if let Err(e) = &store_result {
            tracing::error!(error = %e, "Failed to clear {}", WALLET_ADDRESS_KEY);
        }

        // the wallet's error is the one the user can act on
        let error = match (wallet_result, store_result) {
            (Err(e), _) | (Ok(()), Err(e)) => Some(e),
            (Ok(()), Ok(())) => {
                tracing::info!("Wallet disconnected");
                None
            }
        };

        Disconnected {
            redirect: Route::Landing,
            error,
        }
    }

    /// Session held under `token`
    pub async fn current(&self, token: &SessionToken) -> AppResult<Option<WalletSession>> {
        let Some(raw) = self.store.load(token).await? else {
            return Ok(None);
        };
        match WalletAddress::parse(&raw) {
            Ok(address) => Ok(Some(WalletSession { address })),
            Err(_) => {
                tracing::warn!(value = %raw, "Ignoring malformed {}", WALLET_ADDRESS_KEY);
                Ok(None)
            }
        }
    }

    /// Session for a gated route; fails unless `token` names a connected wallet
    pub async fn authorize(&self, token: Option<&SessionToken>) -> AppResult<WalletSession> {
        let session = match token {
            Some(token) => self.current(token).await?,
            None => None,
        };
        session.ok_or_else(|| {
            AppError::Authentication("Connect a wallet to open the dashboard".to_string())
        })
    }

    /// Whether the session store can be reached
    pub async fn check_store(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
