//! Bot layer - Discord-specific interface, the bot host and its extensions
//!
//! This module ties the poise framework to the [`BotHost`]: startup
//! orchestration, cog loading, slash commands and autocomplete handlers.

/// Built-in cogs and their slash commands
pub mod commands;
/// Cog trait, catalog and the manifest-driven extension loader
pub mod extensions;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;
/// The bot host: live settings and the extension dispatch table
pub mod host;
/// Startup sequence and the client event loop
pub mod startup;

use crate::errors::Error;

pub use extensions::{Cog, CogCatalog, ExtensionId, ExtensionLoader};
pub use host::BotHost;
pub use startup::{run_bot, startup};

/// Context every command receives.
pub type Context<'a> = poise::Context<'a, BotHost, Error>;

/// A poise command bound to the bot host.
pub type Command = poise::Command<BotHost, Error>;
