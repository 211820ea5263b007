use rust_decimal::Decimal;
use serde::Deserialize;

/// An account as listed by `GET /accounts`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(alias = "id")]
    pub account_id: String,
    #[serde(default)]
    pub balance: Option<Decimal>,
}

/// `GET /accounts` answers either a bare array or `{"accounts": [...]}`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum AccountsPayload {
    Bare(Vec<Account>),
    Wrapped { accounts: Vec<Account> },
}

impl AccountsPayload {
    pub(crate) fn into_accounts(self) -> Vec<Account> {
        match self {
            AccountsPayload::Bare(accounts) | AccountsPayload::Wrapped { accounts } => accounts,
        }
    }
}

/// Body of `GET /accounts/validate/{accountId}`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountValidation {
    #[serde(default)]
    pub account_id: String,
    pub valid: bool,
}

/// Body of `GET /accounts/balance/{accountId}`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(default)]
    pub account_id: String,
    pub balance: Decimal,
}

/// One entry of the transaction history.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    pub from_account: String,
    pub to_account: String,
    pub amount: Decimal,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Body of `GET /transactions/history`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionHistory {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}
