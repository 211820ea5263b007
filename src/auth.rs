//! Bearer token issuance via `POST /authToken`.
//!
//! Tokens are optional for most endpoints. They are fetched per call,
//! held in memory for that call only, and never written anywhere.

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::http::HttpClient;
use crate::runtime::Runtime;

/// Scope requested for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Claim {
    Enquiry,
    Transfer,
}

impl Claim {
    pub fn as_str(&self) -> &'static str {
        match self {
            Claim::Enquiry => "enquiry",
            Claim::Transfer => "transfer",
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Claim {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enquiry" => Ok(Claim::Enquiry),
            "transfer" => Ok(Claim::Transfer),
            other => Err(format!(
                "Invalid claim '{}'. Expected 'enquiry' or 'transfer'.",
                other
            )),
        }
    }
}

/// Username and password for the token endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// A bearer token as issued by the API.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    token: String,
    #[serde(default)]
    pub username: String,
    pub scope: Claim,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl AuthToken {
    pub fn new(token: impl Into<String>, scope: Claim) -> Self {
        Self {
            token: token.into(),
            username: String::new(),
            scope,
            permissions: Vec::new(),
            expires_at: None,
        }
    }

    /// The raw token, for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"********")
            .field("username", &self.username)
            .field("scope", &self.scope)
            .field("permissions", &self.permissions)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
struct AuthErrorBody {
    error: Option<String>,
}

/// Requests a token for `claim`.
///
/// A 400, 401 or 403 answer means the credentials were rejected and is
/// returned as [`TransferError::Auth`] without retrying. Transient statuses
/// and network errors are retried like any other call.
#[tracing::instrument(skip(http, config, credentials), fields(username = %credentials.username))]
pub async fn fetch_token<R: Runtime>(
    http: &HttpClient<R>,
    config: &TransferConfig,
    credentials: &Credentials,
    claim: Claim,
) -> Result<AuthToken, TransferError> {
    let url = config.endpoint("/authToken");
    debug!("Requesting '{}' token from {}...", claim, url);

    let execution = http
        .execute::<AuthToken, _>("authToken", None, |client| {
            client
                .post(&url)
                .query(&[("claim", claim.as_str())])
                .json(credentials)
        })
        .await;

    match execution.into_result() {
        Ok(token) => {
            info!(
                "Authenticated as '{}' with '{}' scope",
                credentials.username, token.scope
            );
            Ok(token)
        }
        Err(TransferError::NonTransientHttp {
            status: 400 | 401 | 403,
            body,
        }) => Err(TransferError::Auth(auth_error_message(&body))),
        Err(other) => Err(other),
    }
}

fn auth_error_message(body: &str) -> String {
    serde_json::from_str::<AuthErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                "Invalid credentials".to_string()
            } else {
                body.to_string()
            }
        })
}
