//! Client error types.

use newdle_core::CoreError;
use serde_json::Value;
use thiserror::Error;

/// Error codes that mean the bearer token must be renewed.
pub const TOKEN_REJECTION_CODES: [&str; 2] = ["token_expired", "token_invalid"];

// ============================================================================
// Transport Error
// ============================================================================

/// Failure of a single network exchange, before any HTTP status exists.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The exchange did not finish in time.
    #[error("Request timed out")]
    Timeout,

    /// DNS resolution or TCP/TLS connection failed.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Any other request failure (body streaming, redirects, client build).
    #[error("Request error: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

// ============================================================================
// Client Error
// ============================================================================

/// Final failure of one logical request.
///
/// Every variant names the request URL so the message is usable as-is in
/// user-facing error lists.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The network exchange itself failed. Never retried.
    #[error("Request to {url} failed: {source}")]
    Network {
        /// Request URL.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The response body could not be decoded.
    #[error("Request to {url} failed ({}): Received invalid response ({reason})", status_label(.status))]
    Parse {
        /// Request URL.
        url: String,
        /// HTTP status, when a response was received.
        status: Option<u16>,
        /// Decoder message.
        reason: String,
    },

    /// The server rejected the request with a structured error.
    #[error("Request to {url} failed ({status}): {}", .code.as_deref().unwrap_or("Unknown error"))]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Value of the `error` field of the response body.
        code: Option<String>,
        /// Whole response body, passed through for callers.
        data: Option<Value>,
    },

    /// An authenticated request was attempted but no token is available,
    /// even after a login prompt completed.
    #[error("Request to {url} failed: Not logged in")]
    NotLoggedIn {
        /// Request URL.
        url: String,
    },

    /// The request could not be built (bad endpoint, invalid payload).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no status".to_string(), |s| s.to_string())
}

impl ClientError {
    /// Returns the structured error code of an HTTP failure.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns the HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Parse { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns the response body of an HTTP failure.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ClientError::Http { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    /// Returns true if the server rejected the bearer token as expired or
    /// invalid, which makes the request eligible for one renewal + retry.
    pub fn is_token_rejection(&self) -> bool {
        self.code()
            .is_some_and(|code| TOKEN_REJECTION_CODES.contains(&code))
    }

    /// Returns true for failures caused by the network rather than the server.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network { .. })
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        ClientError::InvalidRequest(err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
