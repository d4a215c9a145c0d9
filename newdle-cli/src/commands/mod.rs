//! CLI command implementations.

pub mod auth;
pub mod config;
pub mod newdles;
pub mod users;
pub mod watch;

use anyhow::{anyhow, Result};
use newdle_fetch::OnDemand;
use serde::Serialize;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Prints a value in the selected format.
pub(crate) fn print<T, F>(cli: &Cli, value: &T, text: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&TextFormatter, &T) -> String,
{
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", text(&formatter, value));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(value)?);
        }
    }
    Ok(())
}

/// Error of a failed binding invocation.
///
/// Keeps the `ClientError` so the exit code can be derived from it.
pub(crate) fn binding_error<I, T>(binding: &OnDemand<I, T>) -> anyhow::Error
where
    I: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    match binding.last_error() {
        Some(err) => err.into(),
        None => anyhow!(binding.state().error),
    }
}
