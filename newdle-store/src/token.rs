//! Session token persistence.
//!
//! The token is stored as a single line in an owner-only file. On startup
//! [`load_initial_token`] logs the stored token in; afterwards a
//! [`TokenSync`] task mirrors every token change to disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use newdle_fetch::{SessionEvent, SessionState};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{remove_file, write_secure};
use crate::session_store::SessionStore;

/// Reads the stored token, if any.
pub async fn read_token(path: &Path) -> Result<Option<String>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let token = content.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Writes the token, or removes the file when there is none.
pub async fn write_token(path: &Path, token: Option<&str>) -> Result<(), StoreError> {
    match token {
        Some(token) => write_secure(path, token.as_bytes()).await,
        None => remove_file(path).await,
    }
}

/// Logs in with the stored token. Returns true if one was found.
pub async fn load_initial_token(store: &SessionStore, path: &Path) -> Result<bool, StoreError> {
    let Some(token) = read_token(path).await? else {
        debug!(path = %path.display(), "No stored token");
        return Ok(false);
    };

    info!(path = %path.display(), "Restoring stored session");
    store.dispatch(SessionEvent::UserLoggedIn(token)).await;
    Ok(true)
}

/// Background task mirroring the session token to a file.
#[derive(Debug)]
pub struct TokenSync {
    task: JoinHandle<()>,
    store: Arc<SessionStore>,
    path: PathBuf,
}

impl TokenSync {
    /// Stops the task and writes the final token state.
    pub async fn finish(self) -> Result<(), StoreError> {
        self.task.abort();
        let token = self.store.token().await;
        write_token(&self.path, token.as_deref()).await
    }
}

/// Starts mirroring token changes to `path`.
///
/// Writes only when the token actually changed; a cleared token deletes
/// the file.
pub fn spawn_token_sync(store: Arc<SessionStore>, path: PathBuf) -> TokenSync {
    let task = {
        let store = Arc::clone(&store);
        let path = path.clone();
        let mut changes = store.subscribe();
        tokio::spawn(async move {
            let mut last = store.token().await;
            while changes.changed().await.is_ok() {
                let token = store.token().await;
                if token == last {
                    continue;
                }

                match write_token(&path, token.as_deref()).await {
                    Ok(()) => debug!(present = token.is_some(), "Token file updated"),
                    Err(e) => warn!(error = %e, "Failed to update token file"),
                }
                last = token;
            }
        })
    };

    TokenSync { task, store, path }
}
