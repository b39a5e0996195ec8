//! Startup sequence and the client event loop.
//!
//! [`startup`] prepares everything that does not need a gateway connection:
//! timezone, working directories, the settings store, extensions and live
//! settings. [`run_bot`] then connects, publishes the command tree once the
//! gateway is ready, and runs until interrupted.

use crate::{
    bot::{BotHost, CogCatalog, ExtensionLoader},
    config::{BotConfig, database},
    core::{SettingsStore, workspace},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};
use tracing::{error, info, instrument};

/// Prefix for text commands; slash commands need none.
pub const COMMAND_PREFIX: &str = "!";

/// Runs every startup step before the client connects.
///
/// Only an unknown timezone is tolerated; any other failure aborts startup.
#[instrument(skip_all)]
pub async fn startup(config: &BotConfig, catalog: &CogCatalog) -> Result<BotHost> {
    let timezone = workspace::configure_timezone(&config.timezone);

    workspace::reset_scratch_dir(&config.temp_dir)?;
    workspace::copy_default_files(&config.default_files_dir, &config.file_dir)?;

    let db = database::connect(&config.database_url).await?;
    let mut host = BotHost::new(SettingsStore::new(db), timezone);

    info!(
        "Available cogs: {}",
        catalog.names().collect::<Vec<_>>().join(", ")
    );
    ExtensionLoader::new(&config.cog_dir)
        .load_all(&mut host, catalog)
        .await?;

    host.load_settings().await?;
    Ok(host)
}

async fn on_error(error: poise::FrameworkError<'_, BotHost, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and serves commands until Ctrl-C.
///
/// The command tree is published from the framework's setup hook. If that
/// fails the shards are shut down and this returns [`Error::Startup`].
#[instrument(skip_all)]
pub async fn run_bot(token: &str, config: &BotConfig, mut host: BotHost) -> Result<()> {
    let commands = host.take_commands();
    let sync_failure: Arc<Mutex<Option<String>>> = Arc::default();
    let setup_failure = Arc::clone(&sync_failure);

    let mut owners = HashSet::new();
    if let Some(owner_id) = config.owner_id {
        owners.insert(serenity::UserId::new(owner_id));
    }

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            owners,
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(COMMAND_PREFIX.to_string()),
                case_insensitive_commands: true,
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                let commands = &framework.options().commands;
                info!("Registering {} commands globally...", commands.len());
                if let Err(e) = poise::builtins::register_globally(ctx, commands).await {
                    error!("Command tree sync failed: {}", e);
                    if let Ok(mut slot) = setup_failure.lock() {
                        *slot = Some(e.to_string());
                    }
                    framework.shard_manager().shutdown_all().await;
                    return Err(e.into());
                }
                info!("{} is ready to serve.", ready.user.name);
                Ok(host)
            })
        })
        .build();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(token, serenity::GatewayIntents::all())
        .activity(serenity::ActivityData::listening(config.status.clone()))
        .framework(framework)
        .await?;
    let shard_manager = Arc::clone(&client.shard_manager);

    info!("Starting bot client...");
    tokio::select! {
        result = client.start() => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Powering down...");
            println!("Powering down...");
            shard_manager.shutdown_all().await;
        }
    }

    let failure = sync_failure.lock().ok().and_then(|mut slot| slot.take());
    if let Some(message) = failure {
        return Err(Error::Startup { message });
    }
    Ok(())
}
