//! Fund transfers: request validation, result types and outcome reporting.
//!
//! A transfer is validated locally by [`TransferRequest::new`] before any
//! network traffic, executed through [`crate::http::HttpClient`], and handed
//! to [`report`] which logs it and turns it into a [`TransferResult`].

mod report;
mod request;
mod result;

pub use report::report;
pub use request::{AccountId, TransferRequest, parse_amount};
pub use result::{TransferFailure, TransferReceipt, TransferResult};
