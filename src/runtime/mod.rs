//! Runtime abstraction for process-level side effects.
//!
//! Everything the client does outside of HTTP goes through [`Runtime`]:
//! reading environment variables, sleeping between retries and prompting
//! the user. Tests swap in `MockRuntime` so that backoff delays can be
//! observed without waiting and configuration can be injected without
//! touching the real process environment.
//!
//! # Structure
//!
//! - `env` - Environment variables and backoff sleeps
//! - `user` - User interaction (line prompts)

mod env;
mod user;

use anyhow::Result;
use async_trait::async_trait;
use std::env as std_env;
use std::time::Duration;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);

    // User interaction
    /// Print `prompt` and read one line of input.
    /// Returns `Ok(None)` once the input is exhausted.
    fn prompt(&self, prompt: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    async fn sleep(&self, duration: Duration) {
        self.sleep_impl(duration).await
    }

    fn prompt(&self, prompt: &str) -> Result<Option<String>> {
        self.prompt_impl(prompt)
    }
}
