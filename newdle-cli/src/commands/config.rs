//! Config command - manage configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::app::load_settings;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set the server URL.
    SetUrl {
        /// Root URL of the newdle server.
        url: String,
    },

    /// Set the request timeout.
    SetTimeout {
        /// Timeout in seconds.
        seconds: u64,
    },

    /// Keep or stop keeping the session token on disk.
    PersistToken {
        /// true or false.
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Reset to defaults.
    Reset,
}

#[derive(Serialize)]
struct PathsOutput {
    settings: String,
    token: String,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli).await,
        ConfigAction::SetUrl { url } => set_url(url, cli).await,
        ConfigAction::SetTimeout { seconds } => set_timeout(*seconds, cli).await,
        ConfigAction::PersistToken { enabled } => set_persist_token(*enabled, cli).await,
        ConfigAction::Reset => reset_config(cli).await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = load_settings(cli).await;
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_settings(
                    &settings,
                    &store.path().display().to_string(),
                    &store.token_path().display().to_string()
                )
            );
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&settings)?);
        }
    }

    Ok(())
}

async fn show_paths(cli: &Cli) -> Result<()> {
    let store = load_settings(cli).await;
    let paths = PathsOutput {
        settings: store.path().display().to_string(),
        token: store.token_path().display().to_string(),
    };

    match cli.format {
        OutputFormat::Text => {
            println!("Settings: {}", paths.settings);
            println!("Token:    {}", paths.token);
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&paths)?);
        }
    }

    Ok(())
}

async fn set_url(url: &str, cli: &Cli) -> Result<()> {
    let store = load_settings(cli).await;
    store.set_base_url(url).await.context("Invalid server URL")?;
    store.save().await?;

    info!(%url, "Server URL updated");
    if !cli.quiet {
        println!("Server set to {url}");
    }
    Ok(())
}

async fn set_timeout(seconds: u64, cli: &Cli) -> Result<()> {
    if seconds == 0 {
        anyhow::bail!("Timeout must be positive");
    }

    let store = load_settings(cli).await;
    store.update(|s| s.timeout_secs = seconds).await;
    store.save().await?;

    if !cli.quiet {
        println!("Timeout set to {seconds}s");
    }
    Ok(())
}

async fn set_persist_token(enabled: bool, cli: &Cli) -> Result<()> {
    let store = load_settings(cli).await;
    store.update(|s| s.persist_token = enabled).await;
    store.save().await?;

    if !enabled {
        newdle_store::write_token(&store.token_path(), None).await?;
    }

    if !cli.quiet {
        println!("Persist token: {enabled}");
    }
    Ok(())
}

async fn reset_config(cli: &Cli) -> Result<()> {
    let store = load_settings(cli).await;
    store.update(|s| *s = newdle_store::Settings::default()).await;
    store.save().await?;

    if !cli.quiet {
        println!("Configuration reset to defaults.");
    }
    Ok(())
}
