use rust_decimal::Decimal;

use super::result::{TransferReceipt, TransferResult};
use crate::http::Execution;

/// Logs the outcome of a transfer with its context and returns it as a [`TransferResult`].
pub fn report(
    from_account: &str,
    to_account: &str,
    amount: Decimal,
    execution: Execution<TransferReceipt>,
) -> TransferResult {
    let attempts = execution.attempts;
    let latency_ms = u64::try_from(execution.elapsed.as_millis()).unwrap_or(u64::MAX);
    let result = TransferResult::from(execution.result);

    match &result {
        TransferResult::Success(receipt) => tracing::info!(
            from_account,
            to_account,
            amount = %amount,
            attempts,
            latency_ms,
            transaction_id = %receipt.transaction_id,
            status = %receipt.status,
            "Transfer successful"
        ),
        TransferResult::Failure(failure) => tracing::error!(
            from_account,
            to_account,
            amount = %amount,
            attempts,
            latency_ms,
            error_kind = %failure.kind,
            http_status = ?failure.http_status,
            errors = ?failure.errors,
            "Transfer failed: {}",
            failure.message
        ),
    }

    result
}
