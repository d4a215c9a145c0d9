//! Client context wiring the executor to its host APIs.
//!
//! The context bundles the transport, the session store and the settings
//! the executor needs. Tests swap the transport for a scripted one.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::ClientError;
use crate::executor::{with_trailing_slash, RequestExecutor};
use crate::host::http::{HttpTransport, DEFAULT_TIMEOUT_SECS};
use crate::host::WireTransport;
use crate::session::SessionState;

/// Local development server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

// ============================================================================
// Client Settings
// ============================================================================

/// Settings for API requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Root URL of the newdle server.
    pub base_url: String,
    /// Per-exchange timeout.
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientSettings {
    /// Creates settings for the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets a custom timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parses the base URL, making sure it ends with a slash.
    pub fn parsed_base_url(&self) -> Result<Url, ClientError> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid base URL {}: {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidRequest(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }
        Ok(with_trailing_slash(url))
    }
}

// ============================================================================
// Client Context
// ============================================================================

/// Everything needed to talk to one newdle server.
pub struct ClientContext {
    /// Request executor bound to the session store.
    pub executor: RequestExecutor,
    /// Settings the context was built with.
    pub settings: ClientSettings,
}

impl ClientContext {
    /// Creates a builder over the given session store.
    pub fn builder(session: Arc<dyn SessionState>) -> ClientContextBuilder {
        ClientContextBuilder::new(session)
    }

    /// Returns the session store.
    pub fn session(&self) -> &Arc<dyn SessionState> {
        self.executor.session()
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client Context Builder
// ============================================================================

/// Builder for constructing a [`ClientContext`].
pub struct ClientContextBuilder {
    session: Arc<dyn SessionState>,
    transport: Option<Arc<dyn WireTransport>>,
    settings: ClientSettings,
}

impl ClientContextBuilder {
    /// Creates a new builder.
    pub fn new(session: Arc<dyn SessionState>) -> Self {
        Self {
            session,
            transport: None,
            settings: ClientSettings::default(),
        }
    }

    /// Sets the transport. Defaults to [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn WireTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the client settings.
    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the server URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.settings.base_url = base_url.into();
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Builds the context.
    ///
    /// Fails if the base URL is invalid or the HTTP client cannot be created.
    pub fn build(self) -> Result<ClientContext, ClientError> {
        let base_url = self.settings.parsed_base_url()?;

        let transport: Arc<dyn WireTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::with_timeout(self.settings.timeout).map_err(|e| {
                    ClientError::InvalidRequest(format!("cannot create HTTP client: {e}"))
                })?,
            ),
        };

        Ok(ClientContext {
            executor: RequestExecutor::new(base_url, transport, self.session),
            settings: self.settings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeSession;

    #[test]
    fn test_default_settings() {
        let settings = ClientSettings::default();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_base_url_normalized() {
        let url = ClientSettings::new("https://newdle.example.com/sub")
            .parsed_base_url()
            .unwrap();
        assert_eq!(url.as_str(), "https://newdle.example.com/sub/");
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(ClientSettings::new("not a url").parsed_base_url().is_err());
        assert!(ClientSettings::new("ftp://host/").parsed_base_url().is_err());
    }

    #[test]
    fn test_context_builder() {
        let ctx = ClientContext::builder(FakeSession::new(None))
            .base_url("http://localhost:8080")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(ctx.executor.base_url().as_str(), "http://localhost:8080/");
        assert_eq!(ctx.settings.timeout, Duration::from_secs(5));
    }
}
