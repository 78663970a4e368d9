//! Chip Discord commands - transfer, standings and history.
//!
//! All figures shown here are replayed from the ledger's transfer records on every
//! call; nothing is cached between commands.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            ledger, standings,
            store::RosterProvider,
            transfer::{self, TransferRequest},
            types::{LedgerId, ParticipantId, Party, TransferType},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::{collections::HashMap, fmt::Write};

    /// Number of history entries shown by `/history`.
    const HISTORY_LIMIT: usize = 15;

    /// Transfer tag offered as a slash command choice.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum TransferTag {
        #[name = "win"]
        Win,
        #[name = "loan"]
        Loan,
    }

    impl From<TransferTag> for TransferType {
        fn from(tag: TransferTag) -> Self {
            match tag {
                TransferTag::Win => Self::Win,
                TransferTag::Loan => Self::Loan,
            }
        }
    }

    /// Sends chips from the author to another participant of the ledger.
    #[poise::command(slash_command, rename = "transfer")]
    pub async fn send_chips(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ledger to record on"]
        #[autocomplete = "autocomplete::autocomplete_active_ledger"]
        ledger_name: String,
        #[description = "Player receiving the chips"] to: serenity::User,
        #[description = "Chips to send"] amount: i64,
        #[description = "win counts toward net result, loan does not"] tag: TransferTag,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;

        let Some(found) = ledger::get_ledger_by_name(db, &ledger_name).await? else {
            ctx.say(format!("❌ Ledger '{ledger_name}' not found.")).await?;
            return Ok(());
        };
        let ledger_id = LedgerId(found.id);

        let author_id = ctx.author().id.to_string();
        let Some(sender) = ledger::get_participant_by_user(db, ledger_id, &author_id).await? else {
            ctx.say(format!("❌ You are not seated on '{}'. Use `/join` first.", found.name))
                .await?;
            return Ok(());
        };
        let Some(receiver) = ledger::get_participant_by_user(db, ledger_id, &to.id.to_string()).await?
        else {
            ctx.say(format!("❌ {} is not seated on '{}'.", to.display_name(), found.name))
                .await?;
            return Ok(());
        };

        let request = TransferRequest {
            ledger_id,
            from: ParticipantId(sender.id),
            to: ParticipantId(receiver.id),
            amount,
            transfer_type: tag.into(),
        };
        match transfer::transfer(db, request, data.settings.limits()).await {
            Ok(record) => {
                ctx.say(format!(
                    "✅ {} sent {} {} to {} as {} on '{}' (Record ID: {})",
                    sender.display_name,
                    amount,
                    data.settings.unit_label,
                    receiver.display_name,
                    request.transfer_type,
                    found.name,
                    record.id.0
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

    /// Shows the leaderboard of a ledger.
    #[poise::command(slash_command)]
    pub async fn standings(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ledger to show"]
        #[autocomplete = "autocomplete::autocomplete_any_ledger"]
        ledger_name: String,
    ) -> Result<()> {
        let data = ctx.data();
        let Some(found) = ledger::get_ledger_by_name(&data.database, &ledger_name).await? else {
            ctx.say(format!("❌ Ledger '{ledger_name}' not found.")).await?;
            return Ok(());
        };

        let current = standings::ledger_standings(&data.database, LedgerId(found.id)).await?;
        let total_allocated = current.total_allocated;
        let seats = current.balances.len();
        let ranked = standings::rank_by_net_result(current.balances);

        let mut description = String::new();
        for (rank, balance) in ranked.iter().enumerate() {
            writeln!(
                &mut description,
                "{}",
                standings::format_standings_line(rank + 1, balance, &data.settings.unit_label)
            )?;
        }
        if description.is_empty() {
            description.push_str("Nobody is seated yet.");
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("🏆 {} ({})", found.name, found.status))
            .description(description)
            .color(0x00F1_C40F)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} player{} | {} {} issued",
                seats,
                if seats == 1 { "" } else { "s" },
                total_allocated,
                data.settings.unit_label
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the running balance of a participant.
    #[poise::command(slash_command)]
    pub async fn history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Ledger to show"]
        #[autocomplete = "autocomplete::autocomplete_any_ledger"]
        ledger_name: String,
        #[description = "Player to show (defaults to you)"] user: Option<serenity::User>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let Some(found) = ledger::get_ledger_by_name(db, &ledger_name).await? else {
            ctx.say(format!("❌ Ledger '{ledger_name}' not found.")).await?;
            return Ok(());
        };
        let ledger_id = LedgerId(found.id);

        let target = user.as_ref().unwrap_or_else(|| ctx.author());
        let Some(seat) = ledger::get_participant_by_user(db, ledger_id, &target.id.to_string()).await?
        else {
            ctx.say(format!("❌ {} is not seated on '{}'.", target.display_name(), found.name))
                .await?;
            return Ok(());
        };

        let roster = db.list_participants(ledger_id).await?;
        let names: HashMap<ParticipantId, &str> = roster
            .iter()
            .map(|p| (p.canonical_id(), p.display_name.as_str()))
            .collect();
        let Some(participant) = roster.iter().find(|p| p.id == ParticipantId(seat.id)) else {
            return Err(Error::ParticipantNotFound {
                participant: seat.id.to_string(),
            });
        };

        let points = standings::participant_history(db, ledger_id, participant).await?;
        let skipped = points.len().saturating_sub(HISTORY_LIMIT);

        let mut text = format!("**{} on {}**\n```\n", participant.display_name, found.name);
        if skipped > 0 {
            writeln!(&mut text, "... {skipped} earlier entries")?;
        }
        for point in points.iter().skip(skipped) {
            let counterpart = match point.counterpart {
                Party::SystemIssuer => "system",
                Party::Participant(id) => names.get(&id).copied().unwrap_or("unknown"),
            };
            let tag = point
                .transfer_type
                .map_or("allocation", TransferType::as_str);
            writeln!(
                &mut text,
                "{} {:>8} -> {:>8}  {tag} / {counterpart}",
                point.created_at.format("%m-%d %H:%M"),
                standings::format_chip_delta(point.delta),
                point.balance
            )?;
        }
        text.push_str("```");

        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
