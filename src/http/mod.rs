//! HTTP executor with retry logic and response classification.

mod client;
mod retry;

pub use client::{Execution, HttpClient};
pub use retry::{
    CallEvent, CallState, Classification, RETRYABLE_STATUSES, RetryPolicy, classify_status,
};
