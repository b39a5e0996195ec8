//! Built-in cogs and their Discord commands.
//!
//! Each cog here is available to the extension loader; it only runs when a
//! manifest with its name is present in the cog directory.

/// General utility commands
pub mod general;

/// Setting management commands
pub mod settings;

use crate::bot::{Cog, CogCatalog, Command};

pub use general::*;
pub use settings::*;

/// Connectivity check and help.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralCog;

impl Cog for GeneralCog {
    fn name(&self) -> &'static str {
        "general"
    }

    fn description(&self) -> &'static str {
        "Connectivity check and help"
    }

    fn commands(&self) -> Vec<Command> {
        vec![ping(), help()]
    }
}

/// Owner-only management of persisted bot settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsCog;

impl Cog for SettingsCog {
    fn name(&self) -> &'static str {
        "settings"
    }

    fn description(&self) -> &'static str {
        "Create, update and list bot settings"
    }

    fn commands(&self) -> Vec<Command> {
        vec![createsetting(), updatesetting(), settings()]
    }
}

/// Every cog compiled into this bot.
#[must_use]
pub fn catalog() -> CogCatalog {
    CogCatalog::new().with(GeneralCog).with(SettingsCog)
}
