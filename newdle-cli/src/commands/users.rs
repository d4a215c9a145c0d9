//! User search command.

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::commands::print;
use crate::Cli;

/// Arguments for the users command.
#[derive(Args)]
pub struct UsersArgs {
    /// Name or email to search for.
    pub query: String,
}

/// Runs the users command.
pub async fn run(args: &UsersArgs, cli: &Cli) -> Result<()> {
    let app = App::start(cli).await?;
    let result = match app.client.search_users(&args.query).await {
        Ok(found) => print(cli, &found, |f, s| f.format_user_search(s)),
        Err(e) => Err(e.into()),
    };
    app.finish(result).await
}
