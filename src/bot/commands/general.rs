//! General Discord commands - ping and help.
//! These need no database access and give users a quick view of what the bot can do.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::Context,
        errors::Result,
    };
    use std::fmt::Write;

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Lists the loaded extensions and every command they provide.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let extensions = ctx.data().extensions();
        let mut help_text = String::from("**Eindjeboss Help**\n");

        let _ = writeln!(help_text, "\n**Loaded extensions** ({})", extensions.len());
        for extension in extensions {
            let _ = writeln!(help_text, "• `{extension}`");
        }

        help_text.push_str("\n**Commands**\n");
        for command in &ctx.framework().options().commands {
            let description = command.description.as_deref().unwrap_or("No description");
            let _ = writeln!(help_text, "• `/{}` - {}", command.name, description);
        }

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
