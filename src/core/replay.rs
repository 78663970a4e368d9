//! Ledger replay engine.
//!
//! Balances are never stored. Every figure reported for a participant is derived
//! here by replaying the ledger's full, append-only transfer history once, in
//! `(created_at, id)` order. All functions are pure: they borrow their inputs,
//! perform no I/O and never fail.

use crate::core::types::{
    Participant, ParticipantBalance, ParticipantId, Party, RecordId, TransferRecord, TransferType,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// How a single record affects one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    Allocated,
    Received,
    Sent,
}

/// Classifies `record` from the point of view of `participant`.
///
/// Receiving takes priority over sending, so the branches are mutually exclusive.
fn effect_on(record: &TransferRecord, participant: ParticipantId) -> Option<Effect> {
    if record.to == participant {
        if record.is_allocation() {
            Some(Effect::Allocated)
        } else {
            Some(Effect::Received)
        }
    } else if record.from.is(participant) {
        Some(Effect::Sent)
    } else {
        None
    }
}

/// Running totals for one canonical participant.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    current_balance: i64,
    total_allocated: i64,
    total_received_via_transfer: i64,
    total_sent_via_transfer: i64,
    win_income: i64,
    win_expense: i64,
    loan_income: i64,
    loan_expense: i64,
}

impl Accumulator {
    fn apply(&mut self, effect: Effect, record: &TransferRecord) {
        let amount = record.amount;
        let transfer_type = record.kind.transfer_type();
        match effect {
            Effect::Allocated => {
                self.current_balance = self.current_balance.saturating_add(amount);
                self.total_allocated = self.total_allocated.saturating_add(amount);
            }
            Effect::Received => {
                self.current_balance = self.current_balance.saturating_add(amount);
                self.total_received_via_transfer =
                    self.total_received_via_transfer.saturating_add(amount);
                match transfer_type {
                    Some(TransferType::Win) => {
                        self.win_income = self.win_income.saturating_add(amount);
                    }
                    Some(TransferType::Loan) => {
                        self.loan_income = self.loan_income.saturating_add(amount);
                    }
                    None => {}
                }
            }
            Effect::Sent => {
                self.current_balance = self.current_balance.saturating_sub(amount);
                self.total_sent_via_transfer = self.total_sent_via_transfer.saturating_add(amount);
                match transfer_type {
                    Some(TransferType::Win) => {
                        self.win_expense = self.win_expense.saturating_add(amount);
                    }
                    Some(TransferType::Loan) => {
                        self.loan_expense = self.loan_expense.saturating_add(amount);
                    }
                    None => {}
                }
            }
        }
    }

    fn finish(self, participant: &Participant) -> ParticipantBalance {
        ParticipantBalance {
            id: participant.id,
            display_name: participant.display_name.clone(),
            current_balance: self.current_balance,
            total_allocated: self.total_allocated,
            total_received_via_transfer: self.total_received_via_transfer,
            total_sent_via_transfer: self.total_sent_via_transfer,
            net_result: self.win_income.saturating_sub(self.win_expense),
            outstanding_loans: self.loan_income.saturating_sub(self.loan_expense),
        }
    }
}

/// Borrows `records` in replay order: creation time, then insertion sequence.
fn replay_order(records: &[TransferRecord]) -> Vec<&TransferRecord> {
    let mut ordered: Vec<&TransferRecord> = records.iter().collect();
    ordered.sort_by_key(|record| (record.created_at, record.id));
    ordered
}

/// Computes the balance of every roster entry by replaying `records` once.
///
/// The output has exactly one entry per roster entry, in roster order. Entries
/// without any matching record are zero-filled. Records that name participants
/// outside the roster are not reflected anywhere; see [`unknown_participants`].
#[must_use]
pub fn compute_balances(
    records: &[TransferRecord],
    roster: &[Participant],
) -> Vec<ParticipantBalance> {
    let mut accumulators: HashMap<ParticipantId, Accumulator> = roster
        .iter()
        .map(|participant| (participant.canonical_id(), Accumulator::default()))
        .collect();

    for record in replay_order(records) {
        let sender = match record.from {
            Party::Participant(id) if id != record.to => Some(id),
            _ => None,
        };
        for party in std::iter::once(record.to).chain(sender) {
            let Some(accumulator) = accumulators.get_mut(&party) else {
                continue;
            };
            if let Some(effect) = effect_on(record, party) {
                accumulator.apply(effect, record);
            }
        }
    }

    roster
        .iter()
        .map(|participant| {
            accumulators
                .get(&participant.canonical_id())
                .copied()
                .unwrap_or_default()
                .finish(participant)
        })
        .collect()
}

/// Net position of every party appearing in `records`, the system issuer included.
///
/// Each record moves `amount` from its sender to its receiver, so the values
/// always sum to zero.
#[must_use]
pub fn party_balances(records: &[TransferRecord]) -> BTreeMap<Party, i64> {
    let mut balances = BTreeMap::new();
    for record in records {
        let receiver = balances.entry(Party::Participant(record.to)).or_insert(0_i64);
        *receiver = receiver.saturating_add(record.amount);
        let sender = balances.entry(record.from).or_insert(0_i64);
        *sender = sender.saturating_sub(record.amount);
    }
    balances
}

/// Balance of the system issuer: the negative of everything it has allocated.
#[must_use]
pub fn system_issuer_balance(records: &[TransferRecord]) -> i64 {
    records
        .iter()
        .filter(|record| record.from == Party::SystemIssuer)
        .fold(0_i64, |balance, record| balance.saturating_sub(record.amount))
}

/// Sum of every recorded amount, `None` if it does not fit in an `i64`.
///
/// No balance or total derived from `records` can exceed this in magnitude.
#[must_use]
pub fn total_volume(records: &[TransferRecord]) -> Option<i64> {
    records
        .iter()
        .try_fold(0_i64, |volume, record| volume.checked_add(record.amount))
}

/// Participants referenced by `records` that no roster entry resolves to.
#[must_use]
pub fn unknown_participants(
    records: &[TransferRecord],
    roster: &[Participant],
) -> BTreeSet<ParticipantId> {
    let known: BTreeSet<ParticipantId> = roster.iter().map(Participant::canonical_id).collect();
    records
        .iter()
        .flat_map(|record| {
            let sender = match record.from {
                Party::Participant(id) => Some(id),
                Party::SystemIssuer => None,
            };
            std::iter::once(record.to).chain(sender)
        })
        .filter(|id| !known.contains(id))
        .collect()
}

/// One step of a participant's balance history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalancePoint {
    /// Record that caused the change
    pub record_id: RecordId,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Signed change applied by the record
    pub delta: i64,
    /// Balance after the record
    pub balance: i64,
    /// The counterpart of the movement
    pub counterpart: Party,
    /// Tag of the movement, if it was a player transfer
    pub transfer_type: Option<TransferType>,
}

/// Running balance of `participant` (a canonical id) after each record touching it.
///
/// The last point's balance equals the participant's `current_balance`.
#[must_use]
pub fn balance_history(records: &[TransferRecord], participant: ParticipantId) -> Vec<BalancePoint> {
    let mut balance = 0_i64;
    replay_order(records)
        .into_iter()
        .filter_map(|record| {
            let effect = effect_on(record, participant)?;
            let (delta, counterpart) = match effect {
                Effect::Allocated | Effect::Received => (record.amount, record.from),
                Effect::Sent => (
                    record.amount.saturating_neg(),
                    Party::Participant(record.to),
                ),
            };
            balance = balance.saturating_add(delta);
            Some(BalancePoint {
                record_id: record.id,
                created_at: record.created_at,
                delta,
                balance,
                counterpart,
                transfer_type: record.kind.transfer_type(),
            })
        })
        .collect()
}
