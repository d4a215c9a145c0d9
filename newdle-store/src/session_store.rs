//! Session state store.
//!
//! Holds the session token, the open login prompt (if any), the profile of
//! the logged-in user and the process-wide error list. All changes go
//! through [`SessionStore::dispatch`] and bump a version that subscribers
//! observe through a watch channel.

use std::sync::Arc;

use async_trait::async_trait;
use newdle_core::User;
use newdle_fetch::{ErrorReporter, LoginPrompt, SessionEvent, SessionState};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::error_list::{ErrorEntry, ErrorList};

// ============================================================================
// Inner State
// ============================================================================

#[derive(Debug, Default)]
struct SessionInner {
    token: Option<String>,
    login_prompt: Option<LoginPrompt>,
    user: Option<User>,
    errors: ErrorList,
}

impl SessionInner {
    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TokenNeeded => self.login_prompt = Some(LoginPrompt::LoginRequired),
            SessionEvent::TokenExpired => self.login_prompt = Some(LoginPrompt::SessionExpired),
            SessionEvent::UserLoggedIn(token) => {
                self.token = Some(token);
                self.login_prompt = None;
            }
            SessionEvent::UserLoggedOut => {
                self.token = None;
                self.user = None;
                self.login_prompt = None;
            }
            SessionEvent::LoginPromptAborted => self.login_prompt = None,
            SessionEvent::UserReceived(user) => self.user = Some(user),
        }
    }
}

// ============================================================================
// Session Store
// ============================================================================

/// Process-wide session state.
///
/// Observable via watch channels. Implements [`SessionState`] for the
/// request executor and [`ErrorReporter`] for the bindings.
pub struct SessionStore {
    inner: Arc<RwLock<SessionInner>>,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates an empty, logged-out store.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(SessionInner::default())),
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    // ========================================================================
    // Session Access
    // ========================================================================

    /// Returns the open login prompt, if any.
    pub async fn login_prompt(&self) -> Option<LoginPrompt> {
        self.inner.read().await.login_prompt
    }

    /// Returns the profile of the logged-in user.
    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    /// Returns true if a token is present.
    pub async fn is_logged_in(&self) -> bool {
        self.inner.read().await.token.is_some()
    }

    // ========================================================================
    // Error List
    // ========================================================================

    /// Adds an error to the list and returns its id.
    pub async fn add_error(&self, message: impl Into<String>) -> u64 {
        let id = self.inner.write().await.errors.add(message);
        self.notify_change().await;
        id
    }

    /// Dismisses one error.
    pub async fn remove_error(&self, id: u64) {
        let removed = self.inner.write().await.errors.remove(id);
        if removed {
            self.notify_change().await;
        }
    }

    /// Dismisses all errors.
    pub async fn clear_errors(&self) {
        self.inner.write().await.errors.clear();
        self.notify_change().await;
    }

    /// Returns the current errors, oldest first.
    pub async fn errors(&self) -> Vec<ErrorEntry> {
        self.inner.read().await.errors.entries().to_vec()
    }

    /// Notifies subscribers of a change.
    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("version", &*self.notify.borrow())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionState for SessionStore {
    async fn token(&self) -> Option<String> {
        self.inner.read().await.token.clone()
    }

    async fn is_acquiring_token(&self) -> bool {
        self.inner.read().await.login_prompt.is_some()
    }

    async fn dispatch(&self, event: SessionEvent) {
        let name = event.name();
        match &event {
            SessionEvent::UserLoggedIn(_) => info!("User logged in"),
            SessionEvent::UserLoggedOut => info!("User logged out"),
            _ => debug!(event = name, "Session event"),
        }

        self.inner.write().await.apply(event);
        self.notify_change().await;
    }

    async fn open_episode(&self, event: SessionEvent) -> bool {
        let Some(prompt) = event.opens_prompt() else {
            warn!(event = event.name(), "Not an episode-opening event");
            return false;
        };

        {
            let mut inner = self.inner.write().await;
            if inner.login_prompt.is_some() {
                return false;
            }
            inner.apply(event);
        }

        info!(?prompt, "Login prompt opened");
        self.notify_change().await;
        true
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }
}

#[async_trait]
impl ErrorReporter for SessionStore {
    async fn report(&self, message: String) {
        warn!(%message, "Operation failed");
        self.add_error(message).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
