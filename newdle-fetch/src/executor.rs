//! Request execution.
//!
//! The executor turns a [`RequestDescriptor`] into one or two wire
//! exchanges. Authenticated requests carry the session token; a request
//! whose token is rejected goes through one renewal episode and is retried
//! exactly once.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::classify::{classify, Outcome};
use crate::coordinator::TokenCoordinator;
use crate::error::ClientError;
use crate::host::{WireRequest, WireTransport};
use crate::request::RequestDescriptor;
use crate::session::SessionState;

const JSON: &str = "application/json";

/// Where a call chain stands with respect to its single retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// First exchange; a token rejection may still be retried.
    Initial,
    /// Exchange after a renewal; every failure is final.
    Retried,
}

/// Executes requests against the newdle API.
#[derive(Clone)]
pub struct RequestExecutor {
    base_url: Url,
    transport: Arc<dyn WireTransport>,
    session: Arc<dyn SessionState>,
    coordinator: TokenCoordinator,
}

impl RequestExecutor {
    /// Creates an executor. Endpoints are resolved relative to `base_url`.
    pub fn new(
        base_url: Url,
        transport: Arc<dyn WireTransport>,
        session: Arc<dyn SessionState>,
    ) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            transport,
            coordinator: TokenCoordinator::new(Arc::clone(&session)),
            session,
        }
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the session store this executor reads tokens from.
    pub fn session(&self) -> &Arc<dyn SessionState> {
        &self.session
    }

    /// Resolves an endpoint path against the base URL.
    pub fn resolve(&self, endpoint: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidRequest(format!("invalid endpoint {endpoint}: {e}")))
    }

    /// Executes one logical call.
    ///
    /// Performs at most two exchanges and opens at most one renewal episode.
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method, endpoint = %descriptor.endpoint))]
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Outcome, ClientError> {
        let url = self.resolve(&descriptor.endpoint)?;
        let mut attempt = Attempt::Initial;
        let mut token = None;

        loop {
            if !descriptor.anonymous && token.is_none() {
                token = Some(self.require_token(&url).await?);
            }

            match self.exchange(descriptor, &url, token.as_deref()).await {
                Err(err)
                    if attempt == Attempt::Initial
                        && !descriptor.anonymous
                        && err.is_token_rejection() =>
                {
                    warn!(code = ?err.code(), "Token rejected, renewing");
                    self.coordinator.acquire_token(true).await;

                    token = self.session.token().await;
                    if token.is_none() {
                        debug!("Renewal ended without a token");
                        return Err(ClientError::NotLoggedIn {
                            url: url.to_string(),
                        });
                    }
                    attempt = Attempt::Retried;
                }
                result => return result,
            }
        }
    }

    /// Returns the current token, running a login episode if there is none.
    async fn require_token(&self, url: &Url) -> Result<String, ClientError> {
        if let Some(token) = self.session.token().await {
            return Ok(token);
        }

        debug!("No token available, waiting for login");
        self.coordinator.acquire_token(false).await;

        self.session
            .token()
            .await
            .ok_or_else(|| ClientError::NotLoggedIn {
                url: url.to_string(),
            })
    }

    /// Performs one exchange and classifies the response.
    async fn exchange(
        &self,
        descriptor: &RequestDescriptor,
        url: &Url,
        token: Option<&str>,
    ) -> Result<Outcome, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                ClientError::InvalidRequest("token contains invalid characters".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let body = match &descriptor.body {
            Some(body) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
                Some(body.to_string())
            }
            None => None,
        };

        let request = WireRequest {
            method: descriptor.method,
            url: url.clone(),
            headers,
            body,
        };

        let response = self
            .transport
            .exchange(&request)
            .await
            .map_err(|source| ClientError::Network {
                url: url.to_string(),
                source,
            })?;

        classify(url.as_str(), &response)
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Makes relative joins append to the base path instead of replacing its
/// last segment.
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

// ============================================================================
// Tests
// ============================================================================
