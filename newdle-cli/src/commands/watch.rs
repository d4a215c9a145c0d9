//! Watch command - follow the answers of a newdle.

use std::io::{stdout, Write};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, Utc};
use clap::Args;
use newdle_core::Newdle;
use newdle_fetch::{ErrorReporter, NewdleClient, OnChange, Pipeline, SubmissionState};
use newdle_store::SessionStore;
use tokio::sync::Mutex;
use tokio::time::interval;
use tracing::info;

use crate::app::{seconds, App};
use crate::output::{JsonFormatter, TextFormatter, WatchOutput};
use crate::{Cli, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Newdle code.
    pub code: String,

    /// Refresh interval in seconds.
    #[arg(long, short, default_value = "30")]
    pub interval: u64,

    /// Minimum interval to use.
    #[arg(long, default_value = "5")]
    pub min_interval: u64,

    /// Load the full view (requires login).
    #[arg(long)]
    pub full: bool,
}

/// Triggers of one refresh: the newdle code and the tick number.
pub type WatchTriggers = (String, u64);

/// Reporter that keeps only the latest refresh failure in the error list.
///
/// Each failure replaces the entry of the previous one, so a long watch
/// never accumulates errors.
pub struct LatestErrorReporter {
    session: Arc<SessionStore>,
    shown: Mutex<Option<u64>>,
}

impl LatestErrorReporter {
    /// Creates a reporter writing to `session`.
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            shown: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ErrorReporter for LatestErrorReporter {
    async fn report(&self, message: String) {
        let mut shown = self.shown.lock().await;
        if let Some(id) = shown.take() {
            self.session.remove_error(id).await;
        }
        *shown = Some(self.session.add_error(message).await);
    }
}

/// Builds the binding that reloads a newdle whenever its triggers change.
pub fn watch_binding(
    client: NewdleClient,
    full: bool,
    reporter: Arc<dyn ErrorReporter>,
) -> OnChange<WatchTriggers, Newdle> {
    OnChange::new(
        Pipeline::new(move |(code, _tick): WatchTriggers| {
            let client = client.clone();
            async move { client.get_newdle(&code, full).await }
        }),
        reporter,
    )
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<()> {
    let refresh_interval = args.interval.max(args.min_interval);

    info!(code = %args.code, interval = refresh_interval, "Starting watch mode");

    let app = App::start(cli).await?;
    let reporter = Arc::new(LatestErrorReporter::new(Arc::clone(&app.session)));
    let binding = watch_binding(app.client.clone(), args.full, reporter);
    let mut states = binding.subscribe();
    let mut ticker = interval(seconds(refresh_interval));
    let mut tick = 0;

    let result = loop {
        tokio::select! {
            _ = ticker.tick() => {
                tick += 1;
                binding.update((args.code.clone(), tick));
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let state = states.borrow_and_update().clone();
                if state.submitting {
                    continue;
                }
                if let Err(e) = render(cli, &args.code, refresh_interval, &state) {
                    break Err(e);
                }
            }
            _ = tokio::signal::ctrl_c() => break Ok(()),
        }
    };

    drop(binding);
    app.finish(result).await
}

fn render(cli: &Cli, code: &str, interval: u64, state: &SubmissionState<Newdle>) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            // Clear screen
            print!("\x1b[2J\x1b[H");
            stdout().flush()?;

            match &state.result {
                Some(newdle) => println!("{}", formatter.format_watch(newdle, Local::now(), interval)),
                None => println!("{}", formatter.format_error(&state.error)),
            }
        }
        OutputFormat::Json => {
            let now = Utc::now();
            let line = match &state.result {
                Some(newdle) => WatchOutput::loaded(newdle, now),
                None => WatchOutput::failed(code, &state.error, now),
            };
            println!("{}", JsonFormatter::new(cli.pretty).format(&line)?);
        }
    }
    Ok(())
}
