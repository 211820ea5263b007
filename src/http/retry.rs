//! Retry policy, response classification and the call state machine.

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::TransferConfig;

/// Statuses worth another attempt: rate limiting and temporary server trouble.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// How a single HTTP response should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success,
    Transient,
    Permanent,
}

/// Classifies a response status.
///
/// 2xx succeeds, the [`RETRYABLE_STATUSES`] are transient, and everything
/// else (other 4xx, 501, unfollowed 3xx) fails without retry.
pub fn classify_status(status: StatusCode) -> Classification {
    if status.is_success() {
        Classification::Success
    } else if RETRYABLE_STATUSES.contains(&status.as_u16()) {
        Classification::Transient
    } else {
        Classification::Permanent
    }
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    pub fn from_config(config: &TransferConfig) -> Self {
        Self::new(config.max_retries(), config.backoff_factor())
    }

    /// Whether a transient failure after `retries_done` retries may be retried again.
    pub fn allows_retry(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }

    /// Delay before retry number `retries_done + 1`: `backoff_factor * 2^retries_done` seconds.
    pub fn delay_for(&self, retries_done: u32) -> Duration {
        if self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retries_done).unwrap_or(i32::MAX);
        let secs = self.backoff_factor * 2f64.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&TransferConfig::default())
    }
}

/// Lifecycle of one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Sent,
    Retrying,
    Succeeded,
    Failed,
}

/// Inputs that drive [`CallState`] forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    /// A request went out (first attempt, or after the backoff delay).
    Send,
    /// The attempt succeeded.
    Success,
    /// The attempt failed in a way retries cannot fix.
    PermanentFailure,
    /// The attempt failed transiently; `budget_left` says whether a retry is allowed.
    TransientFailure { budget_left: bool },
}

impl CallState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Succeeded | CallState::Failed)
    }

    /// Applies `event`. Terminal states absorb every event, and events
    /// that do not apply to the current state leave it unchanged.
    pub fn advance(self, event: CallEvent) -> CallState {
        match (self, event) {
            (CallState::Idle | CallState::Retrying, CallEvent::Send) => CallState::Sent,
            (CallState::Sent, CallEvent::Success) => CallState::Succeeded,
            (CallState::Sent, CallEvent::PermanentFailure) => CallState::Failed,
            (CallState::Sent, CallEvent::TransientFailure { budget_left: true }) => {
                CallState::Retrying
            }
            (CallState::Sent, CallEvent::TransientFailure { budget_left: false }) => {
                CallState::Failed
            }
            (state, _) => state,
        }
    }
}
