//! Gateway to the library module on the ledger.
//!
//! Entry functions (`borrow_book`, `return_book`) go through a
//! [`TransactionSigner`] and then wait for finality on the [`ChainClient`];
//! view functions are plain reads on the client. Nothing is retried: a failed
//! call surfaces to the caller, who decides whether to try again.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    models::{
        BookId, EntryFunction, ModuleId, PendingTransaction, RawViewResult, TransactionHash,
        TransactionPayload, UserData, ViewFunction, ViewRequest, WalletAddress,
    },
};

/// Signs a payload with the user's key and submits it
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign_and_submit(&self, payload: &TransactionPayload) -> AppResult<PendingTransaction>;
}

/// Read access to a ledger node
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn view(&self, request: &ViewRequest) -> AppResult<RawViewResult>;

    /// Resolves once `hash` is committed; fails on timeout or if it aborted
    async fn wait_for_transaction(&self, hash: &TransactionHash) -> AppResult<()>;
}

/// Signer for transactions the browser wallet already signed and submitted.
///
/// The wallet's answer (a pending hash, or the user's rejection) is relayed by
/// the dashboard and replayed here when the gateway asks for a signature.
#[derive(Debug, Clone)]
pub struct RelayedSigner {
    outcome: Result<TransactionHash, String>,
}

impl RelayedSigner {
    pub fn submitted(hash: TransactionHash) -> Self {
        Self { outcome: Ok(hash) }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
        }
    }
}

#[async_trait]
impl TransactionSigner for RelayedSigner {
    async fn sign_and_submit(&self, payload: &TransactionPayload) -> AppResult<PendingTransaction> {
        tracing::debug!(function = payload.function.name(), "Relaying wallet submission");
        match &self.outcome {
            Ok(hash) => Ok(PendingTransaction { hash: hash.clone() }),
            Err(reason) => Err(AppError::Signing(reason.clone())),
        }
    }
}

/// Clears an in-flight entry when the submission finishes
struct InFlight<'a> {
    pending: &'a Mutex<HashSet<EntryFunction>>,
    key: EntryFunction,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(&self.key);
    }
}

#[derive(Clone)]
pub struct ChainGateway {
    client: Arc<dyn ChainClient>,
    module: ModuleId,
    in_flight: Arc<Mutex<HashSet<EntryFunction>>>,
}

impl ChainGateway {
    pub fn new(client: Arc<dyn ChainClient>, module: ModuleId) -> Self {
        Self {
            client,
            module,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    /// Payload a wallet has to sign for `function`
    pub fn payload_for(&self, function: EntryFunction) -> TransactionPayload {
        TransactionPayload::new(self.module.clone(), function)
    }

    /// Borrow a book; returns the finalized transaction hash
    pub async fn borrow(&self, signer: &dyn TransactionSigner, book_id: BookId) -> AppResult<TransactionHash> {
        self.submit(signer, EntryFunction::BorrowBook { book_id }).await
    }

    /// Return a borrowed book; returns the finalized transaction hash
    pub async fn return_book(&self, signer: &dyn TransactionSigner, book_id: BookId) -> AppResult<TransactionHash> {
        self.submit(signer, EntryFunction::ReturnBook { book_id }).await
    }

    /// Every book record held by the module
    pub async fn list_all_books(&self) -> AppResult<RawViewResult> {
        let request = ViewRequest::new(self.module.clone(), ViewFunction::GetAllBooks);
        self.client.view(&request).await
    }

    /// Borrowed and returned records of `user`
    pub async fn get_user_data(&self, user: &WalletAddress) -> AppResult<UserData> {
        let request = ViewRequest::new(
            self.module.clone(),
            ViewFunction::GetUserData { user: user.clone() },
        );
        let result = self.client.view(&request).await?;
        UserData::from_view(result)
    }

    fn claim(&self, key: EntryFunction) -> AppResult<InFlight<'_>> {
        let mut pending = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !pending.insert(key) {
            return Err(AppError::Conflict(format!(
                "{} for book {} is already in progress",
                key.name(),
                key.book_id()
            )));
        }
        Ok(InFlight {
            pending: &self.in_flight,
            key,
        })
    }

    async fn submit(&self, signer: &dyn TransactionSigner, function: EntryFunction) -> AppResult<TransactionHash> {
        let _in_flight = self.claim(function)?;
        let payload = self.payload_for(function);

        tracing::info!(
            function = function.name(),
            book_id = %function.book_id(),
            "Submitting transaction"
        );

        let pending = signer.sign_and_submit(&payload).await.map_err(|e| {
            tracing::warn!(function = function.name(), error = %e, "Signer did not submit transaction");
            match e {
                e @ AppError::Signing(_) => e,
                other => AppError::Signing(other.to_string()),
            }
        })?;

        self.client
            .wait_for_transaction(&pending.hash)
            .await
            .map_err(|e| {
                tracing::warn!(hash = %pending.hash, error = %e, "Transaction did not reach finality");
                e
            })?;

        tracing::info!(function = function.name(), hash = %pending.hash, "Transaction finalized");
        Ok(pending.hash)
    }
}
