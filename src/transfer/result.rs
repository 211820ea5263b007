use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{ErrorKind, TransferError};

/// Body of a successful `POST /transfer`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub transaction_id: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub from_account: String,
    pub to_account: String,
    pub amount: Decimal,
}

/// A transfer that did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFailure {
    pub kind: ErrorKind,
    /// API status string, `FAILED` unless the server said otherwise.
    pub status: String,
    pub message: String,
    pub errors: Vec<String>,
    /// HTTP status of the last response, if one was received.
    pub http_status: Option<u16>,
}

/// Error body the API sends with 4xx responses, e.g.
/// `{"status":"FAILED","message":"Insufficient funds","errors":[...]}`.
#[derive(Debug, Default, Deserialize)]
struct ApiFailureBody {
    status: Option<String>,
    message: Option<String>,
    error: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

const FAILED: &str = "FAILED";

impl From<TransferError> for TransferFailure {
    fn from(error: TransferError) -> Self {
        let kind = error.kind();
        let http_status = error.status();

        let (status, message, errors) = match error {
            TransferError::Validation(errors) => {
                (FAILED.to_string(), "Invalid transfer request".to_string(), errors)
            }
            TransferError::Auth(msg) => {
                (FAILED.to_string(), "Authentication failed".to_string(), vec![msg])
            }
            TransferError::TransientHttp { status, body } => {
                from_http_body(&body, format!("Service unavailable (HTTP {})", status))
            }
            TransferError::NonTransientHttp { status, body } => {
                from_http_body(&body, format!("Request rejected (HTTP {})", status))
            }
            TransferError::Network(msg) => {
                (FAILED.to_string(), "Network error".to_string(), vec![msg])
            }
            TransferError::MalformedResponse(msg) => (
                FAILED.to_string(),
                "Malformed response from API".to_string(),
                vec![msg],
            ),
        };

        Self {
            kind,
            status,
            message,
            errors,
            http_status,
        }
    }
}

fn from_http_body(body: &str, fallback_message: String) -> (String, String, Vec<String>) {
    match serde_json::from_str::<ApiFailureBody>(body) {
        Ok(parsed) => (
            parsed.status.unwrap_or_else(|| FAILED.to_string()),
            parsed.message.or(parsed.error).unwrap_or(fallback_message),
            parsed.errors,
        ),
        Err(_) => {
            let body = body.trim();
            let errors = if body.is_empty() {
                Vec::new()
            } else {
                vec![body.to_string()]
            };
            (FAILED.to_string(), fallback_message, errors)
        }
    }
}

/// Final outcome of a transfer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferResult {
    Success(TransferReceipt),
    Failure(TransferFailure),
}

impl TransferResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferResult::Success(_))
    }

    pub fn receipt(&self) -> Option<&TransferReceipt> {
        match self {
            TransferResult::Success(receipt) => Some(receipt),
            TransferResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&TransferFailure> {
        match self {
            TransferResult::Success(_) => None,
            TransferResult::Failure(failure) => Some(failure),
        }
    }
}

impl From<Result<TransferReceipt, TransferError>> for TransferResult {
    fn from(result: Result<TransferReceipt, TransferError>) -> Self {
        match result {
            Ok(receipt) => TransferResult::Success(receipt),
            Err(error) => TransferResult::Failure(error.into()),
        }
    }
}
