//! Runtime configuration read from environment variables.
//!
//! A `.env` file is honoured through `dotenvy` by the entrypoint before
//! [`BotConfig::from_env`] runs. The Discord token is deliberately not part of
//! this struct; it is read right before the client connects.

/// Database connection and table creation
pub mod database;

use crate::errors::{Error, Result};
use std::path::PathBuf;

/// Timezone used when `BOT_TIMEZONE` is not set.
pub const DEFAULT_TIMEZONE: &str = "Europe/Amsterdam";

/// Bot-wide configuration resolved once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Text shown as the bot's "listening to" activity
    pub status: String,
    /// Discord user id of the bot owner, if configured
    pub owner_id: Option<u64>,
    /// Working file root, repopulated from `default_files_dir` on startup
    pub file_dir: PathBuf,
    /// sea-orm connection URL for the settings database
    pub database_url: String,
    /// IANA timezone name used for timestamps
    pub timezone: String,
    /// Directory scanned for cog manifests
    pub cog_dir: PathBuf,
    /// Bundled template tree copied into `file_dir`
    pub default_files_dir: PathBuf,
    /// Scratch directory wiped on every startup
    pub temp_dir: PathBuf,
}

impl BotConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let owner_id = get("OWNER_ID")
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| Error::Config {
                    message: format!("OWNER_ID must be a numeric Discord user id: {e}"),
                })
            })
            .transpose()?;

        let file_dir = PathBuf::from(get("FILE_DIR").unwrap_or_else(|| "files".to_string()));
        let database_url = get("DATABASE_URL")
            .unwrap_or_else(|| database::default_database_url(&file_dir));

        Ok(Self {
            status: get("BOT_STATUS").unwrap_or_default(),
            owner_id,
            database_url,
            timezone: get("BOT_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            cog_dir: PathBuf::from(get("COG_DIR").unwrap_or_else(|| "cogs".to_string())),
            default_files_dir: PathBuf::from("default_files"),
            temp_dir: PathBuf::from("temp"),
            file_dir,
        })
    }

    /// Path of the rotating log file under the working file root.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.file_dir.join("logs").join("eindjeboss.log")
    }
}
