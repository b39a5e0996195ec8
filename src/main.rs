use dotenvy::dotenv;
use eindjeboss::{
    bot,
    config::BotConfig,
    errors::{Error, Result},
    logging,
};
use std::env;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 2. Resolve configuration
    let config = BotConfig::from_env()?;

    // 3. Logging to console and <FILE_DIR>/logs, kept alive until exit
    let _log_guard = logging::init(&config)?;
    info!("Configuration loaded, logging to {}", config.log_file().display());

    // 4. Prepare workspace, settings store, extensions and live settings
    let host = bot::startup(&config, &bot::commands::catalog())
        .await
        .inspect_err(|e| error!("Startup failed: {}", e))?;

    // 5. Run the bot; the token is read directly before use
    let token = env::var("DISCORD_TOKEN")
        .inspect_err(|e| error!("DISCORD_TOKEN not found: {}", e))
        .map_err(|e| Error::Config {
            message: format!("DISCORD_TOKEN: {e}"),
        })?;

    bot::run_bot(&token, &config, host)
        .await
        .inspect_err(|e| error!("Bot stopped with an error: {}", e))
}
