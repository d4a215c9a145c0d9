//! Login, logout and profile commands.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use newdle_core::User;
use newdle_fetch::{ErrorReporter, NewdleClient, OnDemand, Pipeline, SessionEvent, SessionState};
use newdle_store::SessionStore;
use tracing::info;

use crate::app::App;
use crate::commands::{binding_error, print};
use crate::Cli;

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Token to log in with instead of prompting.
    #[arg(long)]
    pub token: Option<String>,
}

/// Builds the login binding: load the profile, then store it in the session.
///
/// Loading the profile without a token opens the login prompt, so this is
/// also how an interactive login starts.
pub fn login_binding(client: NewdleClient, session: Arc<SessionStore>) -> OnDemand<(), User> {
    let reporter: Arc<dyn ErrorReporter> = session.clone();
    let pipeline = Pipeline::new(move |()| {
        let client = client.clone();
        async move { client.get_me().await }
    })
    .then(move |user: User| {
        let session = Arc::clone(&session);
        async move {
            session.dispatch(SessionEvent::UserReceived(user.clone())).await;
            Ok(user)
        }
    });
    OnDemand::new(pipeline, reporter)
}

/// Runs the login command.
pub async fn login(args: &LoginArgs, cli: &Cli) -> Result<()> {
    let app = App::start(cli).await?;

    if let Some(token) = args.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        app.session
            .dispatch(SessionEvent::UserLoggedIn(token.to_string()))
            .await;
    }

    let binding = login_binding(app.client.clone(), Arc::clone(&app.session));
    let result = match binding.invoke(()).await {
        Some(user) => {
            info!(uid = %user.uid, "Logged in");
            print(cli, &user, |f, u| f.format_login(u))
        }
        None => Err(binding_error(&binding)),
    };

    app.finish(result).await
}

/// Runs the logout command.
pub async fn logout(cli: &Cli) -> Result<()> {
    let app = App::start(cli).await?;
    let was_logged_in = app.session.is_logged_in().await;
    app.session.dispatch(SessionEvent::UserLoggedOut).await;

    if !cli.quiet {
        if was_logged_in {
            println!("Logged out.");
        } else {
            println!("Not logged in.");
        }
    }

    app.finish(Ok(())).await
}

/// Runs the me command.
pub async fn me(cli: &Cli) -> Result<()> {
    let app = App::start(cli).await?;
    let result = match app.client.get_me().await {
        Ok(user) => print(cli, &user, |f, u| f.format_user(u)),
        Err(e) => Err(e.into()),
    };
    app.finish(result).await
}
