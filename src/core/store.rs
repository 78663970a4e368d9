//! Ledger storage and roster seams.
//!
//! The replay engine never talks to storage. Services read a snapshot through
//! [`LedgerStore`] and [`RosterProvider`] and hand the plain vectors to
//! [`crate::core::replay`]. Both traits are implemented for the `SeaORM`
//! [`DatabaseConnection`] here and for [`crate::core::memory::InMemoryLedger`].

use crate::{
    core::{
        replay,
        types::{LedgerId, LedgerStatus, NewTransfer, Participant, TransferRecord},
    },
    entities::{ledger, participant, transfer_record},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::future::Future;

/// Append-only record storage for ledgers.
pub trait LedgerStore {
    /// All records of one ledger, in insertion order.
    fn list_records(
        &self,
        ledger_id: LedgerId,
    ) -> impl Future<Output = Result<Vec<TransferRecord>>> + Send;

    /// Appends an already validated record and returns it with its id and timestamp.
    ///
    /// The ledger's status and volume are re-checked atomically with the write; a
    /// ledger closed since validation yields [`Error::LedgerClosed`].
    fn append_record(
        &self,
        record: NewTransfer,
    ) -> impl Future<Output = Result<TransferRecord>> + Send;

    /// Lifecycle state of the ledger, `None` if it does not exist.
    fn ledger_status(
        &self,
        ledger_id: LedgerId,
    ) -> impl Future<Output = Result<Option<LedgerStatus>>> + Send;
}

/// Source of a ledger's roster.
pub trait RosterProvider {
    /// Participants seated on the ledger, in seating order.
    fn list_participants(
        &self,
        ledger_id: LedgerId,
    ) -> impl Future<Output = Result<Vec<Participant>>> + Send;
}

/// Rejects a record the ledger can no longer take.
///
/// Every figure replay derives is bounded by the ledger's volume (the sum of all
/// recorded amounts), so keeping the volume within `i64` keeps replay from
/// saturating.
pub(crate) fn ensure_appendable(
    ledger_id: LedgerId,
    status: Option<LedgerStatus>,
    records: &[TransferRecord],
    amount: i64,
) -> Result<()> {
    let status = status.ok_or_else(|| Error::LedgerNotFound {
        name: ledger_id.to_string(),
    })?;
    if !status.accepts_records() {
        return Err(Error::LedgerClosed { status });
    }
    if replay::total_volume(records)
        .and_then(|volume| volume.checked_add(amount))
        .is_none()
    {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

fn record_model(record: NewTransfer) -> transfer_record::ActiveModel {
    transfer_record::ActiveModel {
        ledger_id: Set(record.ledger_id.0),
        from_participant_id: Set(record.from.to_column()),
        to_participant_id: Set(record.to.0),
        amount: Set(record.amount),
        kind: Set(record.kind.kind_column().to_string()),
        transfer_type: Set(record.kind.transfer_type().map(|t| t.as_str().to_string())),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
}

async fn records_in<C>(conn: &C, ledger_id: LedgerId) -> Result<Vec<TransferRecord>>
where
    C: ConnectionTrait,
{
    transfer_record::Entity::find()
        .filter(transfer_record::Column::LedgerId.eq(ledger_id.0))
        .order_by_asc(transfer_record::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(TransferRecord::try_from)
        .collect()
}

async fn status_in<C>(conn: &C, ledger_id: LedgerId) -> Result<Option<LedgerStatus>>
where
    C: ConnectionTrait,
{
    ledger::Entity::find_by_id(ledger_id.0)
        .one(conn)
        .await?
        .map(|ledger| ledger.status.parse())
        .transpose()
}

/// Re-reads the ledger on `conn` and inserts `record` if it may still be appended.
///
/// Run it on a transaction so the status read and the insert commit together.
pub(crate) async fn append_in<C>(conn: &C, record: NewTransfer) -> Result<TransferRecord>
where
    C: ConnectionTrait,
{
    let status = status_in(conn, record.ledger_id).await?;
    let records = records_in(conn, record.ledger_id).await?;
    ensure_appendable(record.ledger_id, status, &records, record.amount)?;
    TransferRecord::try_from(record_model(record).insert(conn).await?)
}

impl LedgerStore for DatabaseConnection {
    async fn list_records(&self, ledger_id: LedgerId) -> Result<Vec<TransferRecord>> {
        records_in(self, ledger_id).await
    }

    async fn append_record(&self, record: NewTransfer) -> Result<TransferRecord> {
        let txn = self.begin().await?;
        let stored = append_in(&txn, record).await?;
        txn.commit().await?;
        Ok(stored)
    }

    async fn ledger_status(&self, ledger_id: LedgerId) -> Result<Option<LedgerStatus>> {
        status_in(self, ledger_id).await
    }
}

impl RosterProvider for DatabaseConnection {
    async fn list_participants(&self, ledger_id: LedgerId) -> Result<Vec<Participant>> {
        let seats = participant::Entity::find()
            .filter(participant::Column::LedgerId.eq(ledger_id.0))
            .order_by_asc(participant::Column::Id)
            .all(self)
            .await?;
        Ok(seats.into_iter().map(Participant::from).collect())
    }
}
