//! Contract between the request layer and the process-wide session store.
//!
//! The executor and the token coordinator never hold the token themselves.
//! They read it through [`SessionState`] and ask the store to change it by
//! dispatching [`SessionEvent`]s. Only the store mutates session state.

use async_trait::async_trait;
use newdle_core::User;
use tokio::sync::watch;

/// Why a login prompt is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginPrompt {
    /// No token exists; the user has to log in.
    LoginRequired,
    /// A previously valid token was rejected; the session expired.
    SessionExpired,
}

impl LoginPrompt {
    /// Returns the message shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Self::LoginRequired => "You need to log in to continue.",
            Self::SessionExpired => "Your session expired. Please log in again.",
        }
    }
}

/// Events that change session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A request found no token: open a "must log in" prompt.
    TokenNeeded,
    /// A token was rejected: open a "session expired" prompt.
    TokenExpired,
    /// Login finished with a new token. Closes any prompt.
    UserLoggedIn(String),
    /// The user logged out. Clears the token and closes any prompt.
    UserLoggedOut,
    /// The user dismissed the prompt without logging in or out.
    LoginPromptAborted,
    /// The profile of the logged-in user was loaded.
    UserReceived(User),
}

impl SessionEvent {
    /// Returns the prompt this event opens, if it is an episode-opening event.
    pub fn opens_prompt(&self) -> Option<LoginPrompt> {
        match self {
            Self::TokenNeeded => Some(LoginPrompt::LoginRequired),
            Self::TokenExpired => Some(LoginPrompt::SessionExpired),
            _ => None,
        }
    }

    /// Returns true if this event closes an open prompt.
    pub fn closes_prompt(&self) -> bool {
        matches!(
            self,
            Self::UserLoggedIn(_) | Self::UserLoggedOut | Self::LoginPromptAborted
        )
    }

    /// Short name for logs. Never includes the token.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TokenNeeded => "token_needed",
            Self::TokenExpired => "token_expired",
            Self::UserLoggedIn(_) => "user_logged_in",
            Self::UserLoggedOut => "user_logged_out",
            Self::LoginPromptAborted => "login_prompt_aborted",
            Self::UserReceived(_) => "user_received",
        }
    }
}

/// Read/dispatch/subscribe access to the shared session state.
#[async_trait]
pub trait SessionState: Send + Sync {
    /// Returns the current session token.
    async fn token(&self) -> Option<String>;

    /// Returns true while a login prompt is open.
    async fn is_acquiring_token(&self) -> bool;

    /// Applies an event.
    async fn dispatch(&self, event: SessionEvent);

    /// Applies an episode-opening event only if no prompt is open yet.
    ///
    /// The flag check and the dispatch happen as one transaction. Returns
    /// true if this call opened the episode.
    async fn open_episode(&self, event: SessionEvent) -> bool;

    /// Subscribes to change notifications. The receiver is marked changed
    /// after every applied event.
    fn subscribe(&self) -> watch::Receiver<u64>;
}
