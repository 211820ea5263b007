//! Error taxonomy shared by every call against the banking API.

use std::fmt;

/// Coarse classification of a [`TransferError`], suitable for branching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Auth,
    TransientHttp,
    NonTransientHttp,
    Network,
    MalformedResponse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Auth => "auth",
            ErrorKind::TransientHttp => "transient_http",
            ErrorKind::NonTransientHttp => "non_transient_http",
            ErrorKind::Network => "network",
            ErrorKind::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while talking to the banking API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Input rejected locally; no request was sent.
    Validation(Vec<String>),
    /// Credentials rejected by the token endpoint.
    Auth(String),
    /// HTTP 429, 500, 502, 503 or 504.
    TransientHttp { status: u16, body: String },
    /// Any other non-2xx response.
    NonTransientHttp { status: u16, body: String },
    /// Connection, DNS or timeout failure.
    Network(String),
    /// A 2xx response whose body did not decode.
    MalformedResponse(String),
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Validation(_) => ErrorKind::Validation,
            TransferError::Auth(_) => ErrorKind::Auth,
            TransferError::TransientHttp { .. } => ErrorKind::TransientHttp,
            TransferError::NonTransientHttp { .. } => ErrorKind::NonTransientHttp,
            TransferError::Network(_) => ErrorKind::Network,
            TransferError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransferError::TransientHttp { .. } | TransferError::Network(_)
        )
    }

    /// HTTP status code, for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransferError::TransientHttp { status, .. }
            | TransferError::NonTransientHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Maps a `send()` failure onto the taxonomy.
    ///
    /// Builder errors (an unusable URL, an invalid header) can never succeed
    /// on retry and are reported as validation failures.
    pub(crate) fn from_send(error: reqwest::Error) -> Self {
        if error.is_builder() {
            return TransferError::Validation(vec![format!("Could not build request: {}", error)]);
        }
        if error.is_timeout() {
            return TransferError::Network(format!("Request timed out: {}", error));
        }
        if error.is_connect() {
            return TransferError::Network(format!("Connection failed: {}", error));
        }
        TransferError::Network(error.to_string())
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Validation(errors) => {
                write!(f, "Validation failed: {}", errors.join("; "))
            }
            TransferError::Auth(msg) => write!(f, "Authentication failed: {}", msg),
            TransferError::TransientHttp { status, body } => {
                write!(f, "HTTP {} (transient): {}", status, body)
            }
            TransferError::NonTransientHttp { status, body } => {
                write!(f, "HTTP {}: {}", status, body)
            }
            TransferError::Network(msg) => write!(f, "Network error: {}", msg),
            TransferError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for TransferError {}
