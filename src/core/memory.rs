//! In-memory ledger store.
//!
//! Implements [`LedgerStore`] and [`RosterProvider`] over plain collections behind
//! a `tokio` read-write lock. Used by tests of the services and by embedders that
//! do not want a database.

use crate::{
    core::{
        store::{LedgerStore, RosterProvider, ensure_appendable},
        types::{LedgerId, LedgerStatus, NewTransfer, Participant, RecordId, TransferRecord},
    },
    errors::{Error, Result},
};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    statuses: HashMap<LedgerId, LedgerStatus>,
    rosters: HashMap<LedgerId, Vec<Participant>>,
    records: Vec<TransferRecord>,
    last_record_id: i64,
}

/// Ledger storage held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<State>,
}

impl InMemoryLedger {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ledger, or overwrites the status of an existing one.
    pub async fn set_status(&self, ledger_id: LedgerId, status: LedgerStatus) {
        let mut state = self.state.write().await;
        state.statuses.insert(ledger_id, status);
        state.rosters.entry(ledger_id).or_default();
    }

    /// Seats a participant on a registered ledger.
    pub async fn seat(&self, ledger_id: LedgerId, participant: Participant) -> Result<()> {
        let mut state = self.state.write().await;
        let roster = state
            .rosters
            .get_mut(&ledger_id)
            .ok_or_else(|| Error::LedgerNotFound {
                name: ledger_id.to_string(),
            })?;
        if roster.iter().any(|seated| seated.id == participant.id) {
            return Err(Error::AlreadyJoined);
        }
        roster.push(participant);
        Ok(())
    }

    /// Imports a historical record verbatim, keeping its id and timestamp.
    ///
    /// Imported records skip the append checks.
    pub async fn import_record(&self, record: TransferRecord) {
        let mut state = self.state.write().await;
        state.last_record_id = state.last_record_id.max(record.id.0);
        state.records.push(record);
    }
}

impl LedgerStore for InMemoryLedger {
    async fn list_records(&self, ledger_id: LedgerId) -> Result<Vec<TransferRecord>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .filter(|record| record.ledger_id == ledger_id)
            .cloned()
            .collect())
    }

    async fn append_record(&self, record: NewTransfer) -> Result<TransferRecord> {
        let mut state = self.state.write().await;
        let ledger_records: Vec<TransferRecord> = state
            .records
            .iter()
            .filter(|stored| stored.ledger_id == record.ledger_id)
            .cloned()
            .collect();
        ensure_appendable(
            record.ledger_id,
            state.statuses.get(&record.ledger_id).copied(),
            &ledger_records,
            record.amount,
        )?;
        state.last_record_id += 1;
        let stored = TransferRecord {
            id: RecordId(state.last_record_id),
            ledger_id: record.ledger_id,
            from: record.from,
            to: record.to,
            amount: record.amount,
            kind: record.kind,
            created_at: chrono::Utc::now(),
        };
        state.records.push(stored.clone());
        Ok(stored)
    }

    async fn ledger_status(&self, ledger_id: LedgerId) -> Result<Option<LedgerStatus>> {
        Ok(self.state.read().await.statuses.get(&ledger_id).copied())
    }
}

impl RosterProvider for InMemoryLedger {
    async fn list_participants(&self, ledger_id: LedgerId) -> Result<Vec<Participant>> {
        Ok(self
            .state
            .read()
            .await
            .rosters
            .get(&ledger_id)
            .cloned()
            .unwrap_or_default())
    }
}
