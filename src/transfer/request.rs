use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Serialize, Serializer, ser::Error as _};

use crate::error::TransferError;

const ACCOUNT_PREFIX: &str = "ACC";
const ACCOUNT_DIGITS: usize = 4;

/// Account identifier of the form `ACC` followed by four digits, e.g. `ACC1000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(s: &str) -> bool {
        s.len() == ACCOUNT_PREFIX.len() + ACCOUNT_DIGITS
            && s.starts_with(ACCOUNT_PREFIX)
            && s.bytes().skip(ACCOUNT_PREFIX.len()).all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_well_formed(s) {
            Ok(AccountId(s.to_string()))
        } else {
            Err(format!(
                "Invalid account '{}': expected {} followed by {} digits (e.g. ACC1000)",
                s, ACCOUNT_PREFIX, ACCOUNT_DIGITS
            ))
        }
    }
}

/// A validated transfer, ready to be sent as the `POST /transfer` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    from_account: AccountId,
    to_account: AccountId,
    #[serde(serialize_with = "serialize_amount")]
    amount: Decimal,
}

impl TransferRequest {
    /// Validates every field and collects all violations into one
    /// [`TransferError::Validation`].
    pub fn new(from_account: &str, to_account: &str, amount: Decimal) -> Result<Self, TransferError> {
        let mut errors = Vec::new();

        let from = from_account
            .parse::<AccountId>()
            .map_err(|e| errors.push(format!("fromAccount: {}", e)))
            .ok();
        let to = to_account
            .parse::<AccountId>()
            .map_err(|e| errors.push(format!("toAccount: {}", e)))
            .ok();

        if amount <= Decimal::ZERO {
            errors.push(format!("amount: must be positive, got {}", amount));
        } else if !survives_json_number(amount) {
            errors.push(format!(
                "amount: {} has more precision than the API can represent",
                amount
            ));
        }

        if from_account == to_account {
            errors.push("Cannot transfer to the same account".to_string());
        }

        match (from, to) {
            (Some(from_account), Some(to_account)) if errors.is_empty() => Ok(Self {
                from_account,
                to_account,
                amount,
            }),
            _ => Err(TransferError::Validation(errors)),
        }
    }

    pub fn from_account(&self) -> &AccountId {
        &self.from_account
    }

    pub fn to_account(&self) -> &AccountId {
        &self.to_account
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// The API expects a JSON number, not the string form `Decimal` uses by default.
fn serialize_amount<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    match amount.to_f64() {
        Some(value) => serializer.serialize_f64(value),
        None => Err(S::Error::custom(format!("amount {} is not representable", amount))),
    }
}

/// Whether `amount` comes back unchanged after going through the `f64`
/// the wire format carries.
fn survives_json_number(amount: Decimal) -> bool {
    amount
        .to_f64()
        .filter(|value| value.is_finite())
        .and_then(|value| Decimal::from_str(&value.to_string()).ok())
        .is_some_and(|echoed| echoed == amount)
}

/// Parses user input such as `"100"`, `"25.50"` or `"1e3"` into an amount.
pub fn parse_amount(input: &str) -> Result<Decimal, TransferError> {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| {
            TransferError::Validation(vec![format!(
                "Invalid amount: '{}'. Please enter a valid number.",
                trimmed
            )])
        })
}
