//! Newdle listing, details and deletion.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::Args;
use newdle_core::{slot_time, Newdle, NewdleUpdate};
use newdle_fetch::{ErrorReporter, NewdleClient, OnDemand, Pipeline};
use tracing::info;

use crate::app::App;
use crate::commands::{binding_error, print};
use crate::Cli;

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Newdle code.
    pub code: String,

    /// Load the full view (requires login) instead of the public one.
    #[arg(long)]
    pub full: bool,
}

/// Arguments for the participant command.
#[derive(Args)]
pub struct ParticipantArgs {
    /// Newdle code.
    pub code: String,

    /// Participant code from the invitation link.
    pub participant_code: String,
}

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Newdle code.
    pub code: String,

    /// Email participants about the deletion first.
    #[arg(long)]
    pub notify: bool,
}

/// Arguments for the finalize command.
#[derive(Args)]
pub struct FinalizeArgs {
    /// Newdle code.
    pub code: String,

    /// Chosen slot, `YYYY-MM-DDTHH:MM`.
    pub slot: String,

    /// Email the final date to all participants.
    #[arg(long)]
    pub notify: bool,
}

/// Arguments for the busy command.
#[derive(Args)]
pub struct BusyArgs {
    /// Day, `YYYY-MM-DD`.
    pub date: String,

    /// Participant email.
    pub email: String,
}

/// Runs the mine command.
pub async fn mine(cli: &Cli) -> Result<()> {
    let app = App::start(cli).await?;
    let result = match app.client.get_my_newdles().await {
        Ok(newdles) => print(cli, &newdles, |f, n| f.format_newdle_list(n)),
        Err(e) => Err(e.into()),
    };
    app.finish(result).await
}

/// Runs the participating command.
pub async fn participating(cli: &Cli) -> Result<()> {
    let app = App::start(cli).await?;
    let result = match app.client.get_newdles_participating().await {
        Ok(newdles) => print(cli, &newdles, |f, n| f.format_newdle_list(n)),
        Err(e) => Err(e.into()),
    };
    app.finish(result).await
}

/// Runs the show command.
pub async fn show(args: &ShowArgs, cli: &Cli) -> Result<()> {
    let app = App::start(cli).await?;
    let result = match app.client.get_newdle(&args.code, args.full).await {
        Ok(newdle) => print(cli, &newdle, |f, n| f.format_newdle(n)),
        Err(e) => Err(e.into()),
    };
    app.finish(result).await
}

/// Runs the participant command.
pub async fn participant(args: &ParticipantArgs, cli: &Cli) -> Result<()> {
    let app = App::start(cli).await?;
    let result = match app
        .client
        .get_participant(&args.code, &args.participant_code)
        .await
    {
        Ok(participant) => print(cli, &participant, |f, p| f.format_participant(p)),
        Err(e) => Err(e.into()),
    };
    app.finish(result).await
}

/// Builds the deletion binding: optionally notify participants, then delete.
pub fn delete_binding(
    client: NewdleClient,
    notify: bool,
    reporter: Arc<dyn ErrorReporter>,
) -> OnDemand<String, String> {
    let deleter = client.clone();
    let pipeline = Pipeline::new(move |code: String| {
        let client = client.clone();
        async move {
            if notify {
                client.send_deletion_emails(&code).await?;
            }
            Ok(code)
        }
    })
    .then(move |code: String| {
        let client = deleter.clone();
        async move {
            client.delete_newdle(&code).await?;
            Ok(code)
        }
    });
    OnDemand::new(pipeline, reporter)
}

/// Runs the delete command.
pub async fn delete(args: &DeleteArgs, cli: &Cli) -> Result<()> {
    let app = App::start(cli).await?;
    let binding = delete_binding(app.client.clone(), args.notify, app.session.clone());

    let result = match binding.invoke(args.code.clone()).await {
        Some(code) => {
            info!(%code, notified = args.notify, "Newdle deleted");
            if !cli.quiet {
                println!("Deleted {code}.");
            }
            Ok(())
        }
        None => Err(binding_error(&binding)),
    };
    app.finish(result).await
}

/// Builds the finalize binding: set the final date, then optionally email
/// the result.
pub fn finalize_binding(
    client: NewdleClient,
    notify: bool,
    reporter: Arc<dyn ErrorReporter>,
) -> OnDemand<(String, NaiveDateTime), Newdle> {
    let mailer = client.clone();
    let pipeline = Pipeline::new(move |(code, slot): (String, NaiveDateTime)| {
        let client = client.clone();
        async move {
            let update = NewdleUpdate {
                final_dt: Some(slot),
            };
            client.update_newdle(&code, &update).await
        }
    })
    .then(move |newdle: Newdle| {
        let client = mailer.clone();
        async move {
            if notify {
                client.send_result_emails(&newdle.code).await?;
            }
            Ok(newdle)
        }
    });
    OnDemand::new(pipeline, reporter)
}

/// Runs the finalize command.
pub async fn finalize(args: &FinalizeArgs, cli: &Cli) -> Result<()> {
    let slot = slot_time::parse(&args.slot)?;

    let app = App::start(cli).await?;
    let binding = finalize_binding(app.client.clone(), args.notify, app.session.clone());

    let result = match binding.invoke((args.code.clone(), slot)).await {
        Some(newdle) => {
            info!(code = %newdle.code, notified = args.notify, "Final date set");
            print(cli, &newdle, |f, n| f.format_newdle(n))
        }
        None => Err(binding_error(&binding)),
    };
    app.finish(result).await
}

/// Runs the busy command.
pub async fn busy(args: &BusyArgs, cli: &Cli) -> Result<()> {
    let app = App::start(cli).await?;
    let result = match app.client.get_busy_times(&args.date, &args.email).await {
        Ok(slots) => print(cli, &slots, |f, s| f.format_busy(s)),
        Err(e) => Err(e.into()),
    };
    app.finish(result).await
}
