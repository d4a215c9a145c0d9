// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! newdle CLI - scheduling polls from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Log in (prompts for a token, or reads NEWDLE_TOKEN)
//! newdle login
//!
//! # Newdles you created / were invited to
//! newdle mine
//! newdle participating
//!
//! # Public view of a newdle, or the full one when logged in
//! newdle show dshjfk
//! newdle show dshjfk --full
//!
//! # JSON output
//! newdle mine --format json --pretty
//!
//! # Follow the answers of a newdle
//! newdle watch dshjfk --interval 30
//! ```

mod app;
mod commands;
mod output;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use newdle_fetch::ClientError;
use newdle_store::LogLevel;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{auth, config, newdles, users, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// newdle CLI - scheduling polls.
#[derive(Parser)]
#[command(name = "newdle")]
#[command(about = "Command-line client for the newdle scheduling service")]
#[command(long_about = r#"
newdle finds a time slot that works for everyone.

When a command needs a login, the CLI asks for a token on stdin
(or takes it from NEWDLE_TOKEN) and then continues the request.

Examples:
  newdle login                   # Log in and show the profile
  newdle mine                    # Newdles you created
  newdle show CODE --full        # Full details of a newdle
  newdle --format json mine      # JSON output
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Server URL (overrides the configured one).
    #[arg(long, global = true, env = "NEWDLE_URL")]
    pub url: Option<String>,

    /// Request timeout in seconds (overrides the configured one).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Settings file to use instead of the default one.
    #[arg(long, global = true, env = "NEWDLE_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Log in and show who you are.
    Login(auth::LoginArgs),

    /// Forget the stored session.
    Logout,

    /// Show the logged-in user.
    Me,

    /// Search users to invite.
    Users(users::UsersArgs),

    /// List newdles you created.
    Mine,

    /// List newdles you were invited to.
    Participating,

    /// Show one newdle.
    Show(newdles::ShowArgs),

    /// Show one participant (anonymous).
    Participant(newdles::ParticipantArgs),

    /// Delete a newdle you created.
    Delete(newdles::DeleteArgs),

    /// Pick the final date of a newdle.
    Finalize(newdles::FinalizeArgs),

    /// Show when a participant is busy on a day.
    Busy(newdles::BusyArgs),

    /// Follow the answers of a newdle.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No session after the login prompt.
    NotLoggedIn = 2,
    /// The server rejected the request.
    ServerError = 3,
    /// Network failure or timeout.
    Network = 4,
}

impl ExitCode {
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ClientError>() {
            Some(ClientError::NotLoggedIn { .. }) => ExitCode::NotLoggedIn,
            Some(ClientError::Http { .. } | ClientError::Parse { .. }) => ExitCode::ServerError,
            Some(ClientError::Network { .. }) => ExitCode::Network,
            _ => ExitCode::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("newdle=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("newdle={level}")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = app::load_settings(&cli).await.get().await.log_level;
    setup_logging(cli.verbose, cli.quiet, level);

    let result = match &cli.command {
        Commands::Login(args) => auth::login(args, &cli).await,
        Commands::Logout => auth::logout(&cli).await,
        Commands::Me => auth::me(&cli).await,
        Commands::Users(args) => users::run(args, &cli).await,
        Commands::Mine => newdles::mine(&cli).await,
        Commands::Participating => newdles::participating(&cli).await,
        Commands::Show(args) => newdles::show(args, &cli).await,
        Commands::Participant(args) => newdles::participant(args, &cli).await,
        Commands::Delete(args) => newdles::delete(args, &cli).await,
        Commands::Finalize(args) => newdles::finalize(args, &cli).await,
        Commands::Busy(args) => newdles::busy(args, &cli).await,
        Commands::Watch(args) => watch::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    std::process::exit(ExitCode::Success as i32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use newdle_fetch::TransportError;

    #[test]
    fn test_exit_codes() {
        let not_logged_in = anyhow::Error::new(ClientError::NotLoggedIn {
            url: "http://x/api/me/".to_string(),
        });
        assert_eq!(ExitCode::for_error(&not_logged_in) as i32, 2);

        let network = anyhow::Error::new(ClientError::Network {
            url: "http://x/".to_string(),
            source: TransportError::Timeout,
        });
        assert_eq!(ExitCode::for_error(&network) as i32, 4);

        let http = anyhow::Error::new(ClientError::Http {
            url: "http://x/".to_string(),
            status: 403,
            code: None,
            data: None,
        });
        assert_eq!(ExitCode::for_error(&http) as i32, 3);

        assert_eq!(ExitCode::for_error(&anyhow::anyhow!("other")) as i32, 1);
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::parse_from(["newdle", "--format", "json", "show", "abc", "--full"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Show(ref args) if args.full && args.code == "abc"));
    }
}
