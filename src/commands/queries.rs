use anyhow::Result;
use std::io::Write;

use super::{optional_token, required_token};
use crate::auth::{Claim, Credentials};
use crate::bank::BankClient;
use crate::runtime::Runtime;

/// `bank-xfer accounts`
pub async fn accounts<R: Runtime, W: Write>(
    client: &BankClient<R>,
    credentials: Option<&Credentials>,
    out: &mut W,
) -> Result<()> {
    let token = optional_token(client, credentials, Claim::Enquiry).await;
    let accounts = client.list_accounts(token.as_ref()).await?;

    if accounts.is_empty() {
        writeln!(out, "No accounts found.")?;
        return Ok(());
    }

    writeln!(out, "{:<10} {:>14}", "ACCOUNT", "BALANCE")?;
    for account in &accounts {
        match account.balance {
            Some(balance) => writeln!(out, "{:<10} {:>14}", account.account_id, balance)?,
            None => writeln!(out, "{:<10} {:>14}", account.account_id, "-")?,
        }
    }
    Ok(())
}

/// `bank-xfer validate <account>`; an invalid account is an error.
pub async fn validate<R: Runtime, W: Write>(
    client: &BankClient<R>,
    account: &str,
    credentials: Option<&Credentials>,
    out: &mut W,
) -> Result<()> {
    let token = optional_token(client, credentials, Claim::Enquiry).await;
    let validation = client.validate_account(account, token.as_ref()).await?;

    if validation.valid {
        writeln!(out, "✓ {} is a valid account", account)?;
        Ok(())
    } else {
        writeln!(out, "✗ {} is not a valid account", account)?;
        anyhow::bail!("Account {} is not valid", account)
    }
}

/// `bank-xfer balance <account>`
pub async fn balance<R: Runtime, W: Write>(
    client: &BankClient<R>,
    account: &str,
    credentials: Option<&Credentials>,
    out: &mut W,
) -> Result<()> {
    let token = optional_token(client, credentials, Claim::Enquiry).await;
    let balance = client.balance(account, token.as_ref()).await?;
    writeln!(out, "{} balance: {}", account, balance.balance)?;
    Ok(())
}

/// `bank-xfer history`; requires credentials.
pub async fn history<R: Runtime, W: Write>(
    client: &BankClient<R>,
    limit: u32,
    credentials: Option<&Credentials>,
    out: &mut W,
) -> Result<()> {
    let token = required_token(client, credentials, Claim::Enquiry).await?;
    let history = client.transaction_history(limit, &token).await?;

    if history.transactions.is_empty() {
        writeln!(out, "No transactions found.")?;
        return Ok(());
    }

    for tx in &history.transactions {
        write!(
            out,
            "{}  {} -> {}  {}",
            tx.transaction_id, tx.from_account, tx.to_account, tx.amount
        )?;
        if let Some(status) = &tx.status {
            write!(out, "  {}", status)?;
        }
        if let Some(timestamp) = &tx.timestamp {
            write!(out, "  {}", timestamp)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
