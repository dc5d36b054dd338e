//! Ledger endpoints: library views and borrow/return transactions

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        payload::EntryFunctionPayload, BookId, EntryFunction, StatusBadge, TransactionHash,
        UserData, WalletAddress,
    },
    services::{chain::RelayedSigner, status::classify_raw},
};

use super::ActiveSession;

/// Book record from the ledger, with a badge when its status is recognized
#[derive(Serialize, ToSchema)]
pub struct ChainBook {
    #[schema(value_type = Object)]
    pub record: Value,
    pub badge: Option<StatusBadge>,
}

#[derive(Serialize, ToSchema)]
pub struct ChainBooksResponse {
    pub books: Vec<ChainBook>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Borrow,
    Return,
}

impl Operation {
    fn entry(self, book_id: BookId) -> EntryFunction {
        match self {
            Operation::Borrow => EntryFunction::BorrowBook { book_id },
            Operation::Return => EntryFunction::ReturnBook { book_id },
        }
    }
}

/// Outcome of the wallet's signing step, relayed by the dashboard
#[derive(Deserialize, ToSchema)]
pub struct TransactionRequest {
    pub book_id: BookId,
    /// Hash of the transaction the wallet submitted
    pub hash: Option<String>,
    /// Reason the wallet gave for not submitting
    pub rejection: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct TransactionResponse {
    pub book_id: BookId,
    pub hash: TransactionHash,
}

impl TransactionRequest {
    fn signer(&self) -> AppResult<RelayedSigner> {
        if let Some(reason) = &self.rejection {
            return Ok(RelayedSigner::rejected(reason.clone()));
        }
        match &self.hash {
            Some(hash) => Ok(RelayedSigner::submitted(TransactionHash::parse(hash)?)),
            None => Ok(RelayedSigner::rejected("Wallet did not return a transaction")),
        }
    }
}

fn records(raw: Vec<Value>) -> Vec<ChainBook> {
    // get_all_books returns a single vector of book structs
    let flattened = match <[Value; 1]>::try_from(raw) {
        Ok([Value::Array(books)]) => books,
        Ok([single]) => vec![single],
        Err(raw) => raw,
    };
    flattened
        .into_iter()
        .map(|record| {
            let badge = record
                .get("status")
                .and_then(Value::as_str)
                .and_then(classify_raw);
            ChainBook { record, badge }
        })
        .collect()
}

/// All book records held by the library module
#[utoipa::path(
    get,
    path = "/chain/books",
    tag = "chain",
    responses(
        (status = 200, description = "Book records", body = ChainBooksResponse),
        (status = 502, description = "Node error", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<ChainBooksResponse>> {
    let raw = state.services.chain.list_all_books().await?;
    Ok(Json(ChainBooksResponse { books: records(raw) }))
}

/// Borrowed and returned records of an account
#[utoipa::path(
    get,
    path = "/chain/users/{address}",
    tag = "chain",
    params(
        ("address" = String, Path, description = "Account address")
    ),
    responses(
        (status = 200, description = "Loan records", body = UserData),
        (status = 400, description = "Invalid address", body = crate::error::ErrorResponse),
        (status = 502, description = "Node error or unexpected result", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user_data(
    State(state): State<crate::AppState>,
    Path(address): Path<String>,
) -> AppResult<Json<UserData>> {
    let address = WalletAddress::parse(&address)?;
    let data = state.services.chain.get_user_data(&address).await?;
    Ok(Json(data))
}

/// Payload the wallet must sign for an operation
#[utoipa::path(
    get,
    path = "/chain/payloads/{operation}/{book_id}",
    tag = "chain",
    params(
        ("operation" = Operation, Path, description = "borrow or return"),
        ("book_id" = u64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Entry function payload", body = EntryFunctionPayload)
    )
)]
pub async fn get_payload(
    State(state): State<crate::AppState>,
    Path((operation, book_id)): Path<(Operation, u64)>,
) -> Json<EntryFunctionPayload> {
    let payload = state.services.chain.payload_for(operation.entry(BookId(book_id)));
    Json(payload.to_wire())
}

/// Wait for a wallet-submitted borrow transaction
#[utoipa::path(
    post,
    path = "/chain/borrow",
    security(("bearer_auth" = [])),
    tag = "chain",
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Transaction finalized", body = TransactionResponse),
        (status = 401, description = "No wallet connected", body = crate::error::ErrorResponse),
        (status = 409, description = "Same transaction already in progress", body = crate::error::ErrorResponse),
        (status = 422, description = "Wallet rejected the transaction", body = crate::error::ErrorResponse),
        (status = 504, description = "Finality not reached in time", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    ActiveSession(session): ActiveSession,
    Json(request): Json<TransactionRequest>,
) -> AppResult<Json<TransactionResponse>> {
    let signer = request.signer()?;
    tracing::info!(address = %session.address, book_id = %request.book_id, "Borrow requested");

    let hash = state.services.chain.borrow(&signer, request.book_id).await?;
    Ok(Json(TransactionResponse {
        book_id: request.book_id,
        hash,
    }))
}

/// Wait for a wallet-submitted return transaction
#[utoipa::path(
    post,
    path = "/chain/return",
    security(("bearer_auth" = [])),
    tag = "chain",
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Transaction finalized", body = TransactionResponse),
        (status = 401, description = "No wallet connected", body = crate::error::ErrorResponse),
        (status = 409, description = "Same transaction already in progress", body = crate::error::ErrorResponse),
        (status = 422, description = "Wallet rejected the transaction", body = crate::error::ErrorResponse),
        (status = 504, description = "Finality not reached in time", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    ActiveSession(session): ActiveSession,
    Json(request): Json<TransactionRequest>,
) -> AppResult<Json<TransactionResponse>> {
    let signer = request.signer()?;
    tracing::info!(address = %session.address, book_id = %request.book_id, "Return requested");

    let hash = state.services.chain.return_book(&signer, request.book_id).await?;
    Ok(Json(TransactionResponse {
        book_id: request.book_id,
        hash,
    }))
}
