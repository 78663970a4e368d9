//! Ledger Discord commands - create, join, list, finish and archive.
//!
//! These commands drive the ledger lifecycle through `core::ledger`. Rejections
//! such as duplicate names or closed ledgers are answered in the channel; only
//! infrastructure failures reach the framework error handler.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            ledger,
            types::{LedgerId, LedgerStatus},
        },
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Starts a new ledger and seats the author as its owner.
    #[poise::command(slash_command)]
    pub async fn create_ledger(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the new ledger"] name: String,
        #[description = "Chips every participant receives on joining"] initial: Option<i64>,
    ) -> Result<()> {
        let data = ctx.data();
        let initial = initial.unwrap_or(data.settings.default_initial_allocation);
        let author = ctx.author();

        match ledger::create_ledger(
            &data.database,
            &name,
            &author.id.to_string(),
            author.display_name(),
            initial,
        )
        .await
        {
            Ok((created, _)) => {
                ctx.say(format!(
                    "✅ Created ledger '{}'. You start with {} {}. Others can `/join` it.",
                    created.name, initial, data.settings.unit_label
                ))
                .await?;
            }
            Err(e) if e.is_user_facing() => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Takes a seat on an active ledger.
    #[poise::command(slash_command)]
    pub async fn join(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ledger to join"]
        #[autocomplete = "autocomplete::autocomplete_active_ledger"]
        ledger_name: String,
    ) -> Result<()> {
        let data = ctx.data();
        let Some(found) = ledger::get_ledger_by_name(&data.database, &ledger_name).await? else {
            ctx.say(format!("❌ Ledger '{ledger_name}' not found. Use `/ledgers` to see them."))
                .await?;
            return Ok(());
        };

        let author = ctx.author();
        match ledger::join_ledger(
            &data.database,
            LedgerId(found.id),
            &author.id.to_string(),
            author.display_name(),
        )
        .await
        {
            Ok(_) => {
                ctx.say(format!(
                    "✅ Joined '{}' with {} {}.",
                    found.name, found.initial_allocation, data.settings.unit_label
                ))
                .await?;
            }
            Err(e) if e.is_user_facing() => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Lists all ledgers with their status.
    #[poise::command(slash_command)]
    pub async fn ledgers(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let all = ledger::get_all_ledgers(&ctx.data().database).await?;
        if all.is_empty() {
            ctx.say("📒 No ledgers yet. Start one with `/create_ledger`.")
                .await?;
            return Ok(());
        }

        let mut text = String::from("**Ledgers**\n");
        for entry in &all {
            writeln!(
                &mut text,
                "• {} ({}, created {})",
                entry.name,
                entry.status,
                entry.created_at.format("%Y-%m-%d")
            )?;
        }
        ctx.say(text).await?;
        Ok(())
    }

    async fn change_status(
        ctx: poise::Context<'_, BotData, Error>,
        ledger_name: &str,
        next: LedgerStatus,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let Some(found) = ledger::get_ledger_by_name(db, ledger_name).await? else {
            ctx.say(format!("❌ Ledger '{ledger_name}' not found.")).await?;
            return Ok(());
        };

        if found.owner_user_id != ctx.author().id.to_string() {
            ctx.say("❌ Only the ledger owner can change its status.")
                .await?;
            return Ok(());
        }

        match ledger::set_ledger_status(db, LedgerId(found.id), next).await {
            Ok(updated) => {
                ctx.say(format!("✅ Ledger '{}' is now {next}.", updated.name))
                    .await?;
            }
            Err(e) if e.is_user_facing() => {
                ctx.say(format!("❌ {e}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Ends play on a ledger. Standings stay available.
    #[poise::command(slash_command)]
    pub async fn finish(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ledger to finish"]
        #[autocomplete = "autocomplete::autocomplete_active_ledger"]
        ledger_name: String,
    ) -> Result<()> {
        change_status(ctx, &ledger_name, LedgerStatus::Finished).await
    }

    /// Archives a ledger. Standings stay available.
    #[poise::command(slash_command)]
    pub async fn archive(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ledger to archive"]
        #[autocomplete = "autocomplete::autocomplete_any_ledger"]
        ledger_name: String,
    ) -> Result<()> {
        change_status(ctx, &ledger_name, LedgerStatus::Archived).await
    }
}

// Re-export all commands
pub use inner::*;
