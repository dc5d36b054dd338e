//! Typed payloads for the library module's entry and view functions.
//!
//! Each function carries its own arguments, so a payload can only be built
//! with the argument list its function expects. The JSON shape sent to the
//! node (and handed to browser wallets) is produced by `to_wire`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::{book::BookId, session::WalletAddress};
use crate::error::{AppError, AppResult};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// `address::module` naming the deployed library module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleId {
    address: WalletAddress,
    name: String,
}

impl ModuleId {
    pub fn new(address: WalletAddress, name: &str) -> AppResult<Self> {
        if !IDENTIFIER_RE.is_match(name) {
            return Err(AppError::Validation(format!("Invalid module name: {}", name)));
        }
        Ok(Self {
            address,
            name: name.to_string(),
        })
    }

    /// Module owner; passed as the first argument of every library function
    pub fn address(&self) -> &WalletAddress {
        &self.address
    }

    pub fn function(&self, function: &str) -> String {
        format!("{}::{}::{}", self.address, self.name, function)
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.address, self.name)
    }
}

// ---------------------------------------------------------------------------
// Entry functions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryFunction {
    BorrowBook { book_id: BookId },
    ReturnBook { book_id: BookId },
}

impl EntryFunction {
    pub fn name(&self) -> &'static str {
        match self {
            EntryFunction::BorrowBook { .. } => "borrow_book",
            EntryFunction::ReturnBook { .. } => "return_book",
        }
    }

    pub fn book_id(&self) -> BookId {
        match self {
            EntryFunction::BorrowBook { book_id } | EntryFunction::ReturnBook { book_id } => *book_id,
        }
    }
}

/// Signed-transaction payload for one entry function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPayload {
    pub module: ModuleId,
    pub function: EntryFunction,
}

/// JSON form of an entry-function payload
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EntryFunctionPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub arguments: Vec<Value>,
}

impl TransactionPayload {
    pub fn new(module: ModuleId, function: EntryFunction) -> Self {
        Self { module, function }
    }

    pub fn to_wire(&self) -> EntryFunctionPayload {
        // u64 arguments travel as decimal strings
        let arguments = vec![
            Value::String(self.module.address().to_string()),
            Value::String(self.function.book_id().to_string()),
        ];
        EntryFunctionPayload {
            kind: "entry_function_payload".to_string(),
            function: self.module.function(self.function.name()),
            type_arguments: Vec::new(),
            arguments,
        }
    }
}

// ---------------------------------------------------------------------------
// View functions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewFunction {
    GetAllBooks,
    GetUserData { user: WalletAddress },
}

impl ViewFunction {
    pub fn name(&self) -> &'static str {
        match self {
            ViewFunction::GetAllBooks => "get_all_books",
            ViewFunction::GetUserData { .. } => "get_user_data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub module: ModuleId,
    pub function: ViewFunction,
}

/// JSON body of `POST /v1/view`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewPayload {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

impl ViewRequest {
    pub fn new(module: ModuleId, function: ViewFunction) -> Self {
        Self { module, function }
    }

    pub fn to_wire(&self) -> ViewPayload {
        let mut arguments = vec![Value::String(self.module.address().to_string())];
        if let ViewFunction::GetUserData { user } = &self.function {
            arguments.push(Value::String(user.to_string()));
        }
        ViewPayload {
            function: self.module.function(self.function.name()),
            type_arguments: Vec::new(),
            arguments,
        }
    }
}
