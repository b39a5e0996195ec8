//! Autocomplete handlers for Discord slash command parameters.

use crate::bot::Context;

/// Discord shows at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Suggests ids of live settings containing the partial input (case-insensitive).
pub async fn autocomplete_setting_id(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let ids = ctx.data().setting_ids().await;
    filter_suggestions(ids, partial)
}

/// Keeps the candidates that contain `partial`, sorted, capped at Discord's limit.
#[must_use]
pub fn filter_suggestions(candidates: Vec<String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();

    let mut matching: Vec<String> = candidates
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().contains(&partial_lower))
        .collect();

    // Sort alphabetically for consistent UX
    matching.sort();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}
