//! Environment and timer operations.

use std::env;
use std::time::Duration;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    pub(crate) async fn sleep_impl(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
