//! Typed client for the banking API endpoints.

mod client;
mod types;

pub use client::BankClient;
pub use types::{Account, AccountValidation, Balance, Transaction, TransactionHistory};
