//! Single-flight token acquisition.
//!
//! When a request finds no token, or the server rejects the one it sent,
//! the caller asks the coordinator for a new one. The first caller opens a
//! login episode by dispatching [`SessionEvent::TokenNeeded`] or
//! [`SessionEvent::TokenExpired`]; every later caller joins the open episode
//! instead of opening its own. All callers are released together when the
//! store leaves the acquiring state (login, logout or aborted prompt).

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::session::{SessionEvent, SessionState};

/// Coordinates token renewal across concurrent requests.
#[derive(Clone)]
pub struct TokenCoordinator {
    session: Arc<dyn SessionState>,
}

impl TokenCoordinator {
    /// Creates a coordinator over the given session store.
    pub fn new(session: Arc<dyn SessionState>) -> Self {
        Self { session }
    }

    /// Waits until a login episode has ended, opening one if none is open.
    ///
    /// `expired` selects the prompt: a rejected token opens a "session
    /// expired" prompt, a missing one a "must log in" prompt.
    ///
    /// This never fails and has no timeout: it returns only once the store
    /// clears the acquiring flag. Afterwards the caller must re-read the
    /// token, which is absent if the user logged out or dismissed the prompt.
    /// Dropping the returned future unsubscribes without affecting the
    /// episode for other waiters.
    #[instrument(skip(self))]
    pub async fn acquire_token(&self, expired: bool) {
        // Subscribe before looking at the flag so a clear between the check
        // and the wait cannot be missed.
        let mut changes = self.session.subscribe();

        let event = if expired {
            SessionEvent::TokenExpired
        } else {
            SessionEvent::TokenNeeded
        };

        if self.session.open_episode(event).await {
            info!(expired, "Asking user to log in");
        } else {
            debug!("Waiting for login requested by another request");
        }

        while self.session.is_acquiring_token().await {
            if changes.changed().await.is_err() {
                warn!("Session store went away while waiting for login");
                return;
            }
        }

        debug!("Left token acquisition");
    }
}

impl std::fmt::Debug for TokenCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCoordinator").finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
