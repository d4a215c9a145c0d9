//! Per-invocation wiring: settings, session store, token file, client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use newdle_fetch::{ClientContext, NewdleClient};
use newdle_store::{
    load_initial_token, spawn_token_sync, Settings, SessionStore, SettingsStore, TokenSync,
};
use tokio::io::BufReader;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::prompt::spawn_login_prompt;
use crate::Cli;

/// Environment variable consulted before asking for a token on stdin.
pub const TOKEN_ENV: &str = "NEWDLE_TOKEN";

/// Loads the settings named by `--config`, or the default ones.
pub async fn load_settings(cli: &Cli) -> SettingsStore {
    match &cli.config {
        Some(path) => SettingsStore::load(path.clone()).await,
        None => SettingsStore::load_default().await,
    }
}

/// Applies `--url` and `--timeout` on top of stored settings.
pub fn effective_settings(stored: Settings, cli: &Cli) -> Settings {
    Settings {
        base_url: cli.url.clone().unwrap_or(stored.base_url),
        timeout_secs: cli.timeout.unwrap_or(stored.timeout_secs),
        ..stored
    }
}

/// Everything a command needs to talk to the server.
pub struct App {
    /// Loaded settings.
    pub settings: SettingsStore,
    /// Process-wide session state.
    pub session: Arc<SessionStore>,
    /// Typed API client bound to `session`.
    pub client: NewdleClient,
    sync: Option<TokenSync>,
    prompt: JoinHandle<()>,
}

impl App {
    /// Builds the app for one CLI invocation.
    ///
    /// Restores the stored token and starts the login prompt, which reads
    /// tokens from stdin whenever the session store opens a prompt.
    pub async fn start(cli: &Cli) -> Result<Self> {
        let settings = load_settings(cli).await;
        let effective = effective_settings(settings.get().await, cli);
        effective.validate().context("Invalid settings")?;

        let session = Arc::new(SessionStore::new());

        let sync = if effective.persist_token {
            let token_path = settings.token_path();
            if let Err(e) = load_initial_token(&session, &token_path).await {
                warn!(error = %e, "Could not read stored token");
            }
            Some(spawn_token_sync(Arc::clone(&session), token_path))
        } else {
            None
        };

        let preset = std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty());
        let prompt = spawn_login_prompt(
            Arc::clone(&session),
            BufReader::new(tokio::io::stdin()),
            preset,
        );

        let ctx = ClientContext::builder(session.clone())
            .settings(effective.client_settings())
            .build()?;
        debug!(base_url = %ctx.settings.base_url, "Client ready");

        Ok(Self {
            settings,
            session,
            client: NewdleClient::from_context(ctx),
            sync,
            prompt,
        })
    }

    /// Stops background tasks and writes the final token state.
    pub async fn shutdown(self) -> Result<()> {
        self.prompt.abort();
        if let Some(sync) = self.sync {
            sync.finish().await.context("Failed to store session token")?;
        }
        Ok(())
    }

    /// Shuts down, then hands back the command result.
    ///
    /// A shutdown failure is logged, never allowed to mask the result.
    pub async fn finish<T>(self, result: Result<T>) -> Result<T> {
        if let Err(e) = self.shutdown().await {
            warn!(error = %e, "Shutdown failed");
        }
        result
    }
}

/// Converts seconds from the command line into a polling period.
pub fn seconds(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "newdle",
            "--url",
            "https://newdle.example.com",
            "--timeout",
            "5",
            "mine",
        ]);
        let stored = Settings {
            persist_token: false,
            ..Settings::default()
        };

        let settings = effective_settings(stored, &cli);
        assert_eq!(settings.base_url, "https://newdle.example.com");
        assert_eq!(settings.timeout_secs, 5);
        assert!(!settings.persist_token);
    }

    #[test]
    fn test_seconds_never_zero() {
        assert_eq!(seconds(0), Duration::from_secs(1));
        assert_eq!(seconds(30), Duration::from_secs(30));
    }
}
