//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggests ledger names as the user types. Commands that write to a ledger only
//! offer active ledgers; read-only commands offer every ledger.

use crate::{
    bot::BotData,
    core::ledger,
    entities::ledger::Model as LedgerModel,
    errors::Error,
};

/// Discord caps autocomplete responses at 25 choices.
const MAX_SUGGESTIONS: usize = 25;

fn matching_names(ledgers: Vec<LedgerModel>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = ledgers
        .into_iter()
        .filter(|l| l.name.to_lowercase().contains(&partial_lower))
        .map(|l| l.name)
        .take(MAX_SUGGESTIONS)
        .collect();

    // Sort alphabetically for consistent UX
    matching.sort();
    matching
}

/// Provides autocomplete suggestions among ledgers that accept transfers.
///
/// # Arguments
/// * `ctx` - The poise context containing the database connection
/// * `partial` - The partial string the user has typed so far
pub async fn autocomplete_active_ledger(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(ledgers) = ledger::get_active_ledgers(&ctx.data().database).await else {
        return Vec::new();
    };
    matching_names(ledgers, partial)
}

/// Provides autocomplete suggestions among all ledgers, including finished and
/// archived ones.
pub async fn autocomplete_any_ledger(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(ledgers) = ledger::get_all_ledgers(&ctx.data().database).await else {
        return Vec::new();
    };
    matching_names(ledgers, partial)
}
