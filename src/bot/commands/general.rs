//! General Discord commands - ping and help.
//! This module contains simple commands that don't require database operations.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let unit = &ctx.data().settings.unit_label;
        let help_text = format!(
            "**Point-Hive Help**\n\
            Track {unit} moving between players of a ledger.\n\n\
            **Ledgers**\n\
            • `/create_ledger <name> [initial]` - Starts a ledger and seats you as owner.\n\
            • `/join <ledger>` - Takes a seat and receives the initial {unit}.\n\
            • `/ledgers` - Lists all ledgers and their status.\n\
            • `/finish <ledger>` - Ends play; standings stay readable (owner only).\n\
            • `/archive <ledger>` - Archives a ledger (owner only).\n\n\
            **{unit}**\n\
            • `/transfer <ledger> <user> <amount> <win|loan>` - Sends {unit} to another player.\n\
            • `/standings <ledger>` - Shows the leaderboard.\n\
            • `/history <ledger> [user]` - Shows a running balance.\n\n\
            Only `win` transfers count toward net results; loans are tracked separately.\n\
            • `/ping` - Checks if the bot is responsive."
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
