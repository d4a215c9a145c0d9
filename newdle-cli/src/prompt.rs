//! Terminal login prompt.
//!
//! Watches the session store. Whenever it opens a login prompt, asks for a
//! token and dispatches the answer, which ends the login episode every
//! waiting request is blocked on.

use std::sync::Arc;

use newdle_fetch::{SessionEvent, SessionState};
use newdle_store::SessionStore;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Starts answering login prompts.
///
/// `preset` is used for the first prompt instead of reading a line. An empty
/// line or end of input aborts the prompt.
pub fn spawn_login_prompt<R>(
    session: Arc<SessionStore>,
    reader: R,
    preset: Option<String>,
) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut changes = session.subscribe();
        let mut lines = reader.lines();
        let mut preset = preset;

        loop {
            if let Some(prompt) = session.login_prompt().await {
                let token = match preset.take() {
                    Some(token) => {
                        debug!("Answering login prompt with preset token");
                        Some(token.trim().to_string())
                    }
                    None => {
                        eprintln!("{} Paste your token (empty to cancel):", prompt.message());
                        read_token(&mut lines).await
                    }
                };

                let event = match token {
                    Some(token) => SessionEvent::UserLoggedIn(token),
                    None => SessionEvent::LoginPromptAborted,
                };
                debug!(event = event.name(), "Login prompt answered");
                session.dispatch(event).await;
                continue;
            }

            if changes.changed().await.is_err() {
                break;
            }
        }
    })
}

async fn read_token<R>(lines: &mut Lines<R>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    match lines.next_line().await {
        Ok(Some(line)) => {
            let token = line.trim();
            (!token.is_empty()).then(|| token.to_string())
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Could not read token");
            None
        }
    }
}
