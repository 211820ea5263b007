//! Command implementations behind the `bank-xfer` CLI.
//!
//! Each command writes its human-readable output to the given writer and
//! returns an error when the operation failed, so `main` can exit non-zero.

mod interactive;
mod queries;

use anyhow::{Result, anyhow, bail};
use log::warn;
use rust_decimal::Decimal;
use std::io::Write;

use crate::auth::{AuthToken, Claim, Credentials};
use crate::bank::BankClient;
use crate::runtime::Runtime;
use crate::transfer::{TransferRequest, TransferResult, parse_amount};

pub use interactive::interactive;
pub use queries::{accounts, balance, history, validate};

/// Fetches a token when credentials were supplied.
///
/// Authentication is optional for everything but the history endpoint, so
/// a rejected login is logged and the call proceeds without a token.
async fn optional_token<R: Runtime>(
    client: &BankClient<R>,
    credentials: Option<&Credentials>,
    claim: Claim,
) -> Option<AuthToken> {
    let credentials = credentials?;
    match client.authenticate(credentials, claim).await {
        Ok(token) => Some(token),
        Err(e) => {
            warn!("Continuing without authentication: {}", e);
            None
        }
    }
}

/// Token for a transfer, fetched only once the transfer passes local
/// validation so invalid input never reaches the network.
async fn transfer_token<R: Runtime>(
    client: &BankClient<R>,
    from_account: &str,
    to_account: &str,
    amount: Decimal,
    credentials: Option<&Credentials>,
    claim: Claim,
) -> Option<AuthToken> {
    match TransferRequest::new(from_account, to_account, amount) {
        Ok(_) => optional_token(client, credentials, claim).await,
        Err(_) => None,
    }
}

async fn required_token<R: Runtime>(
    client: &BankClient<R>,
    credentials: Option<&Credentials>,
    claim: Claim,
) -> Result<AuthToken> {
    let Some(credentials) = credentials else {
        bail!("This command requires --username and --password (or TRANSFER_USERNAME / TRANSFER_PASSWORD)");
    };
    Ok(client.authenticate(credentials, claim).await?)
}

/// Writes a transfer outcome; returns whether it succeeded.
pub(crate) fn write_result<W: Write>(out: &mut W, result: &TransferResult) -> Result<bool> {
    match result {
        TransferResult::Success(receipt) => {
            writeln!(
                out,
                "✓ Transfer successful! Transaction ID: {}",
                receipt.transaction_id
            )?;
            writeln!(
                out,
                "  {} -> {}, amount: {} ({})",
                receipt.from_account, receipt.to_account, receipt.amount, receipt.status
            )?;
            if !receipt.message.is_empty() {
                writeln!(out, "  {}", receipt.message)?;
            }
            Ok(true)
        }
        TransferResult::Failure(failure) => {
            writeln!(out, "✗ Transfer failed: {}", failure.message)?;
            for error in &failure.errors {
                writeln!(out, "  - {}", error)?;
            }
            Ok(false)
        }
    }
}

/// `bank-xfer transfer`: one transfer, optionally authenticated.
#[tracing::instrument(skip(client, credentials, out))]
pub async fn transfer<R: Runtime, W: Write>(
    client: &BankClient<R>,
    from_account: &str,
    to_account: &str,
    amount: &str,
    credentials: Option<&Credentials>,
    claim: Claim,
    out: &mut W,
) -> Result<()> {
    let amount = parse_amount(amount)?;
    let token =
        transfer_token(client, from_account, to_account, amount, credentials, claim).await;

    let result = client
        .transfer(from_account, to_account, amount, token.as_ref())
        .await;

    if write_result(out, &result)? {
        Ok(())
    } else {
        let message = result
            .failure()
            .map(|f| f.message.clone())
            .unwrap_or_default();
        Err(anyhow!("Transfer failed: {}", message))
    }
}

/// `bank-xfer token`: prints a freshly issued token.
#[tracing::instrument(skip(client, credentials, out))]
pub async fn token<R: Runtime, W: Write>(
    client: &BankClient<R>,
    credentials: Option<&Credentials>,
    claim: Claim,
    out: &mut W,
) -> Result<()> {
    let token = required_token(client, credentials, claim).await?;

    writeln!(out, "Token: {}", token.secret())?;
    writeln!(out, "Scope: {}", token.scope)?;
    if !token.permissions.is_empty() {
        writeln!(out, "Permissions: {}", token.permissions.join(", "))?;
    }
    if let Some(expires_at) = &token.expires_at {
        writeln!(out, "Expires: {}", expires_at)?;
    }
    Ok(())
}
