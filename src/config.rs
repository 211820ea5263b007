//! Client configuration resolved from the environment.

use std::env::VarError;
use std::fmt;
use std::time::Duration;

use log::debug;
use reqwest::{Client, Url};

use crate::runtime::Runtime;

pub const ENV_API_URL: &str = "TRANSFER_API_URL";
pub const ENV_TIMEOUT: &str = "TRANSFER_TIMEOUT";
pub const ENV_MAX_RETRIES: &str = "TRANSFER_MAX_RETRIES";
pub const ENV_BACKOFF_FACTOR: &str = "TRANSFER_BACKOFF_FACTOR";

pub const DEFAULT_API_URL: &str = "http://localhost:8123";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 0.3;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("bank-xfer/", env!("BANK_XFER_VERSION"));

/// A configuration value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The value was present but could not be parsed or was out of range.
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    /// The environment variable held bytes that are not valid unicode.
    NotUnicode(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value, reason } => {
                write!(f, "Invalid value for {}: '{}' ({})", key, value, reason)
            }
            ConfigError::NotUnicode(key) => {
                write!(f, "Invalid value for {}: not valid unicode", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Connection and retry settings for one client invocation.
///
/// Fields are private; a value is built once by [`TransferConfig::resolve`]
/// (or [`Default`]) and then only read.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferConfig {
    api_url: String,
    timeout: Duration,
    max_retries: u32,
    backoff_factor: f64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }
}

/// Raw overrides layered on top of the environment, e.g. from CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub timeout: Option<String>,
    pub max_retries: Option<String>,
    pub backoff_factor: Option<String>,
}

impl TransferConfig {
    /// Reads the `TRANSFER_*` variables, falling back to defaults for unset or empty ones.
    #[tracing::instrument(skip(runtime))]
    pub fn resolve<R: Runtime + ?Sized>(runtime: &R) -> Result<Self, ConfigError> {
        let overrides = ConfigOverrides {
            api_url: read_env(runtime, ENV_API_URL)?,
            timeout: read_env(runtime, ENV_TIMEOUT)?,
            max_retries: read_env(runtime, ENV_MAX_RETRIES)?,
            backoff_factor: read_env(runtime, ENV_BACKOFF_FACTOR)?,
        };

        let config = Self::default().with_overrides(
            &overrides,
            [ENV_API_URL, ENV_TIMEOUT, ENV_MAX_RETRIES, ENV_BACKOFF_FACTOR],
        )?;
        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }

    /// Applies CLI-style overrides; the error names the offending flag.
    pub fn apply(self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        self.with_overrides(
            overrides,
            ["--api-url", "--timeout", "--max-retries", "--backoff-factor"],
        )
    }

    fn with_overrides(self, overrides: &ConfigOverrides, keys: [&str; 4]) -> Result<Self, ConfigError> {
        let [url_key, timeout_key, retries_key, backoff_key] = keys;
        Ok(Self {
            api_url: match &overrides.api_url {
                Some(raw) => parse_api_url(url_key, raw)?,
                None => self.api_url,
            },
            timeout: match &overrides.timeout {
                Some(raw) => parse_timeout(timeout_key, raw)?,
                None => self.timeout,
            },
            max_retries: match &overrides.max_retries {
                Some(raw) => parse_max_retries(retries_key, raw)?,
                None => self.max_retries,
            },
            backoff_factor: match &overrides.backoff_factor {
                Some(raw) => parse_backoff_factor(backoff_key, raw)?,
                None => self.backoff_factor,
            },
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Joins `path` (which must start with `/`) onto the API base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Builds the pooled HTTP client; the timeout bounds each attempt.
    pub fn build_client(&self) -> reqwest::Result<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()
    }
}

fn read_env<R: Runtime + ?Sized>(runtime: &R, key: &str) -> Result<Option<String>, ConfigError> {
    match runtime.env_var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(key.to_string())),
    }
}

fn parse_api_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| invalid(key, raw, &e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(key, raw, "scheme must be http or https"));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(key, raw, "expected a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid(key, raw, "must be a positive number of seconds"));
    }
    let timeout =
        Duration::try_from_secs_f64(secs).map_err(|e| invalid(key, raw, &e.to_string()))?;
    if timeout.is_zero() {
        return Err(invalid(key, raw, "rounds down to zero"));
    }
    Ok(timeout)
}

fn parse_max_retries(key: &str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(key, raw, "expected a non-negative integer"))
}

fn parse_backoff_factor(key: &str, raw: &str) -> Result<f64, ConfigError> {
    let factor: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(key, raw, "expected a number"))?;
    if !factor.is_finite() || factor < 0.0 {
        return Err(invalid(key, raw, "must be a non-negative number"));
    }
    Ok(factor)
}
