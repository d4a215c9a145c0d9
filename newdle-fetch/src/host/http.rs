//! Wire transport: one HTTP exchange per call.
//!
//! The transport performs the exchange and hands back the raw status and
//! body. It never retries and never interprets status codes; that is the
//! job of [`crate::classify`] and [`crate::executor`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::error::TransportError;
use crate::request::Method;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for the newdle client.
const USER_AGENT: &str = concat!("newdle-client/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Wire Types
// ============================================================================

/// A fully resolved request, ready to be sent.
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Request headers (`Accept`, `Authorization`, `Content-Type`).
    pub headers: HeaderMap,
    /// JSON-encoded body.
    pub body: Option<String>,
}

/// Raw result of an exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl WireResponse {
    /// Creates a response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a response whose body is the given JSON document.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }
}

impl fmt::Debug for WireResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireResponse")
            .field("status", &self.status)
            .field("body_len", &self.body.len())
            .finish()
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Performs exactly one network exchange per call.
#[async_trait]
pub trait WireTransport: Send + Sync {
    /// Sends the request and returns the raw response.
    async fn exchange(&self, request: &WireRequest) -> Result<WireResponse, TransportError>;
}

// ============================================================================
// HTTP Transport
// ============================================================================

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
}

impl HttpTransport {
    /// Creates a transport with the default timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a transport with a custom timeout.
    ///
    /// Fails only if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { inner })
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(inner: Client) -> Self {
        Self { inner }
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl WireTransport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn exchange(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        debug!("Sending request");

        let mut builder = self
            .inner
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        debug!(status, body_len = body.len(), "Response received");
        Ok(WireResponse { status, body })
    }
}
