//! HTTP executor with bounded exponential-backoff retry.

use std::time::{Duration, Instant};

use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::retry::{CallEvent, CallState, Classification, RetryPolicy, classify_status};
use crate::error::TransferError;
use crate::runtime::Runtime;

/// Longest slice of a response body quoted in a decode error.
const BODY_EXCERPT_CHARS: usize = 200;

/// Outcome of one logical call, including every retry it took.
#[derive(Debug)]
pub struct Execution<T> {
    pub result: Result<T, TransferError>,
    /// Requests actually sent; 0 when the call was rejected before sending.
    pub attempts: u32,
    pub elapsed: Duration,
}

impl<T> Execution<T> {
    /// A call that never left the process.
    pub fn rejected(error: TransferError) -> Self {
        Self {
            result: Err(error),
            attempts: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn into_result(self) -> Result<T, TransferError> {
        self.result
    }
}

/// HTTP client with built-in retry logic for calls against the banking API.
///
/// The wrapped [`Client`] is the connection pool; it is cheap to clone and
/// safe to share between concurrent calls. Backoff sleeps go through the
/// [`Runtime`] so they can be observed in tests.
pub struct HttpClient<R: Runtime> {
    client: Client,
    runtime: R,
    policy: RetryPolicy,
}

impl<R: Runtime> HttpClient<R> {
    pub fn new(client: Client, runtime: R, policy: RetryPolicy) -> Self {
        Self {
            client,
            runtime,
            policy,
        }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Sends the request produced by `build`, retrying transient failures,
    /// and decodes a 2xx JSON body into `T`.
    ///
    /// `build` is called once per attempt. When `bearer` is set it is sent
    /// as an `Authorization: Bearer` header on every attempt.
    #[tracing::instrument(skip(self, bearer, build))]
    pub async fn execute<T, F>(&self, operation: &str, bearer: Option<&str>, build: F) -> Execution<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let started = Instant::now();
        let mut state = CallState::Idle;
        let mut retries: u32 = 0;

        loop {
            state = state.advance(CallEvent::Send);

            let mut request = build(&self.client);
            if let Some(token) = bearer {
                request = request.bearer_auth(token);
            }

            let outcome = attempt::<T>(request).await;
            let attempts = retries.saturating_add(1);

            let error = match outcome {
                Ok(value) => {
                    state = state.advance(CallEvent::Success);
                    debug_assert_eq!(state, CallState::Succeeded);
                    debug!("{}: succeeded after {} attempt(s)", operation, attempts);
                    return Execution {
                        result: Ok(value),
                        attempts,
                        elapsed: started.elapsed(),
                    };
                }
                Err(error) => error,
            };

            let event = if error.is_transient() {
                CallEvent::TransientFailure {
                    budget_left: self.policy.allows_retry(retries),
                }
            } else {
                CallEvent::PermanentFailure
            };
            state = state.advance(event);

            if state == CallState::Failed {
                if error.is_transient() {
                    warn!(
                        "{}: giving up after {} attempt(s): {}",
                        operation, attempts, error
                    );
                } else {
                    debug!("{}: non-retryable error: {}", operation, error);
                }
                return Execution {
                    result: Err(error),
                    attempts,
                    elapsed: started.elapsed(),
                };
            }

            let delay = self.policy.delay_for(retries);
            warn!(
                "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                operation,
                attempts,
                self.policy.max_retries.saturating_add(1),
                error,
                delay.as_millis()
            );
            self.runtime.sleep(delay).await;
            retries = retries.saturating_add(1);
        }
    }
}

/// Single attempt without retry.
async fn attempt<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, TransferError> {
    let response = request.send().await.map_err(TransferError::from_send)?;
    let status = response.status();
    let body = response.text().await.map_err(TransferError::from_send)?;

    match classify_status(status) {
        Classification::Success => serde_json::from_str(&body).map_err(|e| {
            TransferError::MalformedResponse(format!(
                "{} (body: {:?})",
                e,
                body.chars().take(BODY_EXCERPT_CHARS).collect::<String>()
            ))
        }),
        Classification::Transient => Err(TransferError::TransientHttp {
            status: status.as_u16(),
            body,
        }),
        Classification::Permanent => Err(TransferError::NonTransientHttp {
            status: status.as_u16(),
            body,
        }),
    }
}
