//! Ledger responses

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Undecoded return values of a view function
pub type RawViewResult = Vec<Value>;

/// Hash of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "0xabc")]
pub struct TransactionHash(String);

impl TransactionHash {
    pub fn parse(raw: &str) -> AppResult<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        let digits = normalized
            .strip_prefix("0x")
            .filter(|d| !d.is_empty() && d.len() <= 64)
            .ok_or_else(|| AppError::Validation(format!("Invalid transaction hash: {}", raw)))?;
        // hex::decode wants whole bytes
        let padded = if digits.len() % 2 == 1 {
            format!("0{}", digits)
        } else {
            digits.to_string()
        };
        hex::decode(&padded)
            .map_err(|e| AppError::Validation(format!("Invalid transaction hash {}: {}", raw, e)))?;
        Ok(TransactionHash(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TransactionHash {
    type Error = AppError;

    fn try_from(v: String) -> Result<Self, Self::Error> {
        TransactionHash::parse(&v)
    }
}

impl From<TransactionHash> for String {
    fn from(h: TransactionHash) -> Self {
        h.0
    }
}

impl std::fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signer's answer once a transaction has been submitted
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingTransaction {
    pub hash: TransactionHash,
}

/// Loan records of one account, as returned by `get_user_data`
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserData {
    #[schema(value_type = Vec<Object>)]
    pub borrowed: RawViewResult,
    #[schema(value_type = Vec<Object>)]
    pub returned: RawViewResult,
}

impl UserData {
    /// Decode the `(borrowed, returned)` pair returned by the view function
    pub fn from_view(result: RawViewResult) -> AppResult<Self> {
        let [borrowed, returned]: [Value; 2] = result.try_into().map_err(|r: RawViewResult| {
            AppError::UnexpectedShape(format!(
                "get_user_data returned {} values, expected 2",
                r.len()
            ))
        })?;

        Ok(Self {
            borrowed: into_records("borrowed", borrowed)?,
            returned: into_records("returned", returned)?,
        })
    }
}

fn into_records(field: &str, value: Value) -> AppResult<RawViewResult> {
    match value {
        Value::Array(records) => Ok(records),
        other => Err(AppError::UnexpectedShape(format!(
            "get_user_data {} records should be a list, got {}",
            field, other
        ))),
    }
}
