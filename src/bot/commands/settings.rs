//! Settings Discord commands - create, update and list bot settings.
//!
//! Owner-only. Values are typed as text and parsed as JSON where possible, so
//! `42` becomes a number and `#general` stays a string. Validation and lookup
//! errors from the host are shown to the invoker by the framework error handler.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete},
        core::setting::parse_value,
        errors::Result,
    };
    use serde_json::json;
    use std::fmt::Write;

    /// Creates a new bot setting.
    #[poise::command(slash_command, prefix_command, owners_only)]
    pub async fn createsetting(
        ctx: Context<'_>,
        #[description = "Unique key of the setting"] id: String,
        #[description = "What the setting controls"] description: String,
        #[description = "Initial value (JSON or plain text)"] value: String,
    ) -> Result<()> {
        let setting = ctx
            .data()
            .add_setting(json!({
                "id": id.trim(),
                "description": description,
                "value": parse_value(&value),
            }))
            .await?;

        ctx.say(format!(
            "✅ Added setting `{}` with value `{}`",
            setting.id, setting.value
        ))
        .await?;
        Ok(())
    }

    /// Changes the value of an existing bot setting.
    #[poise::command(slash_command, prefix_command, owners_only)]
    pub async fn updatesetting(
        ctx: Context<'_>,
        #[description = "Setting to change"]
        #[autocomplete = "autocomplete::autocomplete_setting_id"]
        id: String,
        #[description = "New value (JSON or plain text)"] value: String,
    ) -> Result<()> {
        let new_value = parse_value(&value);
        let old_value = ctx
            .data()
            .update_setting(&json!({"id": id.trim(), "value": new_value}))
            .await?;

        ctx.say(format!(
            "✅ Updated `{}` to `{new_value}` (was `{old_value}`)",
            id.trim()
        ))
        .await?;
        Ok(())
    }

    /// Lists every stored setting with its description and value.
    #[poise::command(slash_command, prefix_command, owners_only)]
    pub async fn settings(ctx: Context<'_>) -> Result<()> {
        let settings = ctx.data().get_settings().await?;

        if settings.is_empty() {
            ctx.say("No settings yet. Create one with `/createsetting`.")
                .await?;
            return Ok(());
        }

        let mut text = format!("**Settings** ({})\n", settings.len());
        for setting in &settings {
            let _ = writeln!(
                text,
                "• `{}` = `{}` - {}",
                setting.id, setting.value, setting.description
            );
        }

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
