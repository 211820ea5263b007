use anyhow::Result;
use log::debug;
use std::io::Write;

use super::{transfer_token, write_result};
use crate::auth::{Claim, Credentials};
use crate::bank::BankClient;
use crate::runtime::Runtime;
use crate::transfer::parse_amount;

const QUIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

/// `bank-xfer interactive`: prompts for transfers until the user quits
/// or input ends. Failed transfers are reported and the loop goes on.
pub async fn interactive<R: Runtime, W: Write>(
    client: &BankClient<R>,
    credentials: Option<&Credentials>,
    claim: Claim,
    out: &mut W,
) -> Result<()> {
    let runtime = client.runtime();

    writeln!(out, "Money Transfer System")?;
    writeln!(out, "API: {}", client.config().api_url())?;

    loop {
        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(50))?;

        let Some(from_account) = runtime.prompt("Enter source account (or 'quit' to exit):")? else {
            break;
        };
        if QUIT_WORDS.contains(&from_account.to_ascii_lowercase().as_str()) {
            break;
        }

        let Some(to_account) = runtime.prompt("Enter destination account:")? else {
            break;
        };
        let Some(amount) = runtime.prompt("Enter amount to transfer:")? else {
            break;
        };

        let amount = match parse_amount(&amount) {
            Ok(amount) => amount,
            Err(e) => {
                writeln!(out, "✗ {}", e)?;
                continue;
            }
        };

        let token = transfer_token(
            client,
            &from_account,
            &to_account,
            amount,
            credentials,
            claim,
        )
        .await;
        let result = client
            .transfer(&from_account, &to_account, amount, token.as_ref())
            .await;
        let succeeded = write_result(out, &result)?;
        debug!("Interactive transfer finished, success: {}", succeeded);
    }

    writeln!(out)?;
    writeln!(out, "Thank you for using the Money Transfer System!")?;
    Ok(())
}
