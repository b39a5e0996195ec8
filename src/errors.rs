//! Unified error type for the bot host.
//!
//! Setting validation and lookup errors are meant to be shown to the user who
//! invoked the command; everything else is logged and, during startup, fatal.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Setting {record} does not match expected fields")]
    InvalidSetting { record: String },

    #[error("Setting '{id}' already exists. Change it with /updatesetting")]
    DuplicateSetting { id: String },

    #[error("Setting '{id}' not found. Create it with /createsetting")]
    SettingNotFound { id: String },

    #[error("No cog named '{name}' is compiled into this bot")]
    UnknownExtension { name: String },

    #[error("Extension '{name}' is already loaded")]
    ExtensionAlreadyLoaded { name: String },

    #[error("Invalid cog manifest {}: {message}", path.display())]
    InvalidManifest { path: PathBuf, message: String },

    #[error("Startup failed: {message}")]
    Startup { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
