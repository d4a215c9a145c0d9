//! In-memory collaborators for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tokio::sync::watch;

use crate::binding::ErrorReporter;
use crate::error::TransportError;
use crate::host::{WireRequest, WireResponse, WireTransport};
use crate::session::{SessionEvent, SessionState};

// ============================================================================
// Fake Session
// ============================================================================

#[derive(Default)]
struct FakeState {
    token: Option<String>,
    acquiring: bool,
    opened: Vec<SessionEvent>,
}

/// Minimal session store that records which events opened an episode.
pub(crate) struct FakeSession {
    state: Mutex<FakeState>,
    changes: watch::Sender<u64>,
    attempts: AtomicUsize,
}

impl FakeSession {
    pub(crate) fn new(token: Option<&str>) -> Arc<Self> {
        let (changes, _) = watch::channel(0);
        Arc::new(Self {
            state: Mutex::new(FakeState {
                token: token.map(str::to_string),
                ..FakeState::default()
            }),
            changes,
            attempts: AtomicUsize::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn apply(state: &mut FakeState, event: &SessionEvent) {
        match event {
            SessionEvent::TokenNeeded | SessionEvent::TokenExpired => state.acquiring = true,
            SessionEvent::UserLoggedIn(token) => {
                state.token = Some(token.clone());
                state.acquiring = false;
            }
            SessionEvent::UserLoggedOut => {
                state.token = None;
                state.acquiring = false;
            }
            SessionEvent::LoginPromptAborted => state.acquiring = false,
            SessionEvent::UserReceived(_) => {}
        }
    }

    pub(crate) async fn login(&self, token: &str) {
        self.dispatch(SessionEvent::UserLoggedIn(token.to_string()))
            .await;
    }

    pub(crate) async fn logout(&self) {
        self.dispatch(SessionEvent::UserLoggedOut).await;
    }

    /// Events that successfully opened an episode.
    pub(crate) fn opened_events(&self) -> Vec<SessionEvent> {
        self.lock().opened.clone()
    }

    /// Number of `open_episode` calls, successful or not.
    pub(crate) fn episode_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Yields until at least `n` callers tried to open an episode.
    pub(crate) async fn wait_for_episode_attempts(&self, n: usize) {
        while self.episode_attempts() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl SessionState for FakeSession {
    async fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    async fn is_acquiring_token(&self) -> bool {
        self.lock().acquiring
    }

    async fn dispatch(&self, event: SessionEvent) {
        Self::apply(&mut self.lock(), &event);
        self.changes.send_modify(|v| *v += 1);
    }

    async fn open_episode(&self, event: SessionEvent) -> bool {
        let opened = {
            let mut state = self.lock();
            if state.acquiring {
                false
            } else {
                Self::apply(&mut state, &event);
                state.opened.push(event);
                true
            }
        };
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if opened {
            self.changes.send_modify(|v| *v += 1);
        }
        opened
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

// ============================================================================
// Scripted Transport
// ============================================================================

type Responder = dyn Fn(&WireRequest) -> Result<WireResponse, TransportError> + Send + Sync;

/// Transport that answers from a closure and records every request.
pub(crate) struct ScriptedTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<WireRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&WireRequest) -> Result<WireResponse, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<WireRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl WireTransport for ScriptedTransport {
    async fn exchange(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        // Give concurrent callers a chance to interleave like real I/O would.
        tokio::task::yield_now().await;
        (self.responder)(request)
    }
}

/// Returns the bearer token a request carried.
pub(crate) fn bearer(request: &WireRequest) -> Option<String> {
    request
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

// ============================================================================
// Recording Reporter
// ============================================================================

/// Error reporter that keeps every message.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ErrorReporter for RecordingReporter {
    async fn report(&self, message: String) {
        self.messages.lock().unwrap().push(message);
    }
}
