//! Standings generation business logic.
//!
//! Reads a ledger snapshot through the store traits, replays it, and shapes the
//! result for display: leaderboard ranking, per-participant history, and text
//! formatting. All functions are framework-agnostic; the bot layer only renders.

use crate::{
    core::{
        replay::{self, BalancePoint},
        store::{LedgerStore, RosterProvider},
        types::{LedgerId, Participant, ParticipantBalance, ParticipantId},
    },
    errors::Result,
};
use std::cmp::Ordering;
use tracing::{instrument, warn};

/// Replayed state of a whole ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standings {
    /// Ledger the standings belong to
    pub ledger_id: LedgerId,
    /// One entry per roster participant, in roster order
    pub balances: Vec<ParticipantBalance>,
    /// Sum of every allocation issued on the ledger
    pub total_allocated: i64,
    /// Sum of chips currently held by roster participants
    pub total_held: i64,
    /// Participants referenced by records but missing from the roster
    pub unknown_participants: Vec<ParticipantId>,
}

impl Standings {
    /// Whether held chips exactly match what the system issued.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_held == self.total_allocated
    }
}

/// Replays a ledger and summarises it.
///
/// Records naming participants outside the roster are logged and left out; they
/// never fail the call.
#[instrument(skip(store))]
pub async fn ledger_standings<S>(store: &S, ledger_id: LedgerId) -> Result<Standings>
where
    S: LedgerStore + RosterProvider + Sync,
{
    let records = store.list_records(ledger_id).await?;
    let roster = store.list_participants(ledger_id).await?;

    let balances = replay::compute_balances(&records, &roster);
    let unknown: Vec<ParticipantId> = replay::unknown_participants(&records, &roster)
        .into_iter()
        .collect();
    if !unknown.is_empty() {
        warn!(
            ledger_id = ledger_id.0,
            "Ledger has records for {} participant(s) outside the roster: {:?}",
            unknown.len(),
            unknown
        );
    }

    let total_held = balances
        .iter()
        .fold(0_i64, |sum, b| sum.saturating_add(b.current_balance));
    Ok(Standings {
        ledger_id,
        balances,
        total_allocated: replay::system_issuer_balance(&records).saturating_neg(),
        total_held,
        unknown_participants: unknown,
    })
}

/// Orders balances for a leaderboard: net result, then current balance (both
/// descending), then display name.
#[must_use]
pub fn rank_by_net_result(mut balances: Vec<ParticipantBalance>) -> Vec<ParticipantBalance> {
    balances.sort_by(|a, b| {
        b.net_result
            .cmp(&a.net_result)
            .then_with(|| b.current_balance.cmp(&a.current_balance))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    balances
}

/// Running balance of one roster participant across the ledger's history.
#[instrument(skip(store, participant), fields(participant_id = participant.id.0))]
pub async fn participant_history<S>(
    store: &S,
    ledger_id: LedgerId,
    participant: &Participant,
) -> Result<Vec<BalancePoint>>
where
    S: LedgerStore + Sync,
{
    let records = store.list_records(ledger_id).await?;
    Ok(replay::balance_history(&records, participant.canonical_id()))
}

/// Formats a signed chip amount like "+500", "-500" or "0".
#[must_use]
pub fn format_chip_delta(amount: i64) -> String {
    match amount.cmp(&0) {
        Ordering::Greater => format!("+{amount}"),
        Ordering::Less | Ordering::Equal => amount.to_string(),
    }
}

/// Generates one leaderboard line.
///
/// # Returns
/// Formatted line like "1. Alice | 2500 chips | net +500"
#[must_use]
pub fn format_standings_line(rank: usize, balance: &ParticipantBalance, unit_label: &str) -> String {
    let loans = if balance.outstanding_loans == 0 {
        String::new()
    } else {
        format!(" | loans {}", format_chip_delta(balance.outstanding_loans))
    };
    format!(
        "{rank}. {} | {} {unit_label} | net {}{loans}",
        balance.display_name,
        balance.current_balance,
        format_chip_delta(balance.net_result)
    )
}
