//! Transfer ingestion - The only way records enter a ledger.
//!
//! Every record is checked here before it is appended, so that replay can remain a
//! total function over whatever the store returns. Checks run cheapest first:
//! amount, self transfer, ledger lifecycle, roster membership. The store then
//! re-checks the lifecycle and the ledger's volume atomically with the append, so a
//! ledger finished in between rejects the record. Sender balances are not checked;
//! a participant may owe chips.

use crate::{
    core::{
        store::{LedgerStore, RosterProvider},
        types::{
            LedgerId, NewTransfer, Participant, ParticipantId, Party, TransferKind,
            TransferRecord, TransferType,
        },
    },
    errors::{Error, Result},
};
use tracing::{info, instrument, warn};

/// Upper bounds applied to ingested amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferLimits {
    /// Largest amount a single record may carry, unbounded if `None`
    pub max_amount: Option<i64>,
}

/// A player-to-player transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    /// Ledger to record on
    pub ledger_id: LedgerId,
    /// Sending participant
    pub from: ParticipantId,
    /// Receiving participant
    pub to: ParticipantId,
    /// Chips to move
    pub amount: i64,
    /// Win or loan
    pub transfer_type: TransferType,
}

/// Rejects non-positive amounts and amounts above the configured limit.
pub fn validate_amount(amount: i64, limits: TransferLimits) -> Result<()> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    if limits.max_amount.is_some_and(|max| amount > max) {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

async fn ensure_active<S>(store: &S, ledger_id: LedgerId) -> Result<()>
where
    S: LedgerStore + Sync,
{
    let status = store
        .ledger_status(ledger_id)
        .await?
        .ok_or_else(|| Error::LedgerNotFound {
            name: ledger_id.to_string(),
        })?;
    if !status.accepts_records() {
        return Err(Error::LedgerClosed { status });
    }
    Ok(())
}

fn ensure_seated(roster: &[Participant], participant: ParticipantId) -> Result<()> {
    if roster
        .iter()
        .any(|seated| seated.canonical_id() == participant)
    {
        Ok(())
    } else {
        Err(Error::ParticipantNotFound {
            participant: participant.to_string(),
        })
    }
}

async fn check_allocation<S>(
    store: &S,
    ledger_id: LedgerId,
    to: ParticipantId,
    amount: i64,
    limits: TransferLimits,
) -> Result<()>
where
    S: LedgerStore + RosterProvider + Sync,
{
    validate_amount(amount, limits)?;
    ensure_active(store, ledger_id).await?;
    ensure_seated(&store.list_participants(ledger_id).await?, to)
}

async fn check_transfer<S>(store: &S, request: TransferRequest, limits: TransferLimits) -> Result<()>
where
    S: LedgerStore + RosterProvider + Sync,
{
    validate_amount(request.amount, limits)?;
    if request.from == request.to {
        return Err(Error::SelfTransfer);
    }
    ensure_active(store, request.ledger_id).await?;
    let roster = store.list_participants(request.ledger_id).await?;
    ensure_seated(&roster, request.from)?;
    ensure_seated(&roster, request.to)
}

/// Issues an allocation from the system to a seated participant.
#[instrument(skip(store))]
pub async fn allocate<S>(
    store: &S,
    ledger_id: LedgerId,
    to: ParticipantId,
    amount: i64,
    limits: TransferLimits,
) -> Result<TransferRecord>
where
    S: LedgerStore + RosterProvider + Sync,
{
    check_allocation(store, ledger_id, to, amount, limits)
        .await
        .inspect_err(|e| warn!("Rejected allocation: {}", e))?;

    let record = store
        .append_record(NewTransfer {
            ledger_id,
            from: Party::SystemIssuer,
            to,
            amount,
            kind: TransferKind::System,
        })
        .await?;
    info!(record_id = record.id.0, "Allocated {} to participant {}", amount, to);
    Ok(record)
}

/// Records a win- or loan-tagged transfer between two seated participants.
#[instrument(skip(store))]
pub async fn transfer<S>(
    store: &S,
    request: TransferRequest,
    limits: TransferLimits,
) -> Result<TransferRecord>
where
    S: LedgerStore + RosterProvider + Sync,
{
    check_transfer(store, request, limits)
        .await
        .inspect_err(|e| warn!("Rejected transfer: {}", e))?;

    let record = store
        .append_record(NewTransfer {
            ledger_id: request.ledger_id,
            from: Party::Participant(request.from),
            to: request.to,
            amount: request.amount,
            kind: TransferKind::PlayerTransfer {
                transfer_type: request.transfer_type,
            },
        })
        .await?;
    info!(
        record_id = record.id.0,
        "Recorded {} transfer of {} from {} to {}",
        request.transfer_type,
        request.amount,
        request.from,
        request.to
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        ledger,
        memory::InMemoryLedger,
        standings,
        types::{LedgerStatus, NewTransfer},
    };
    use crate::test_utils::{join_test_participant, setup_with_ledger};
    use sea_orm::DatabaseConnection;

    const LEDGER: LedgerId = LedgerId(1);
    const ALICE: ParticipantId = ParticipantId(1);
    const BOB: ParticipantId = ParticipantId(2);

    async fn seeded_store() -> InMemoryLedger {
        let store = InMemoryLedger::new();
        store.set_status(LEDGER, LedgerStatus::Active).await;
        store.seat(LEDGER, Participant::new(ALICE, "Alice")).await.unwrap();
        store.seat(LEDGER, Participant::new(BOB, "Bob")).await.unwrap();
        store
    }

    fn request(amount: i64) -> TransferRequest {
        TransferRequest {
            ledger_id: LEDGER,
            from: ALICE,
            to: BOB,
            amount,
            transfer_type: TransferType::Win,
        }
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(1, TransferLimits::default()).is_ok());
        assert!(matches!(
            validate_amount(0, TransferLimits::default()),
            Err(Error::InvalidAmount { amount: 0 })
        ));
        assert!(matches!(
            validate_amount(-5, TransferLimits::default()),
            Err(Error::InvalidAmount { amount: -5 })
        ));

        let limits = TransferLimits {
            max_amount: Some(100),
        };
        assert!(validate_amount(100, limits).is_ok());
        assert!(matches!(
            validate_amount(101, limits),
            Err(Error::InvalidAmount { amount: 101 })
        ));
    }

    #[tokio::test]
    async fn test_transfer_appends_tagged_record() -> Result<()> {
        let store = seeded_store().await;
        let record = transfer(&store, request(500), TransferLimits::default()).await?;

        assert_eq!(record.from, Party::Participant(ALICE));
        assert_eq!(record.to, BOB);
        assert_eq!(
            record.kind,
            TransferKind::PlayerTransfer {
                transfer_type: TransferType::Win
            }
        );
        assert_eq!(store.list_records(LEDGER).await?, vec![record]);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_rejections_leave_ledger_untouched() -> Result<()> {
        let store = seeded_store().await;

        let zero = transfer(&store, request(0), TransferLimits::default()).await;
        assert!(matches!(zero, Err(Error::InvalidAmount { amount: 0 })));

        let mut to_self = request(10);
        to_self.to = ALICE;
        let result = transfer(&store, to_self, TransferLimits::default()).await;
        assert!(matches!(result, Err(Error::SelfTransfer)));

        let mut stranger = request(10);
        stranger.to = ParticipantId(99);
        let result = transfer(&store, stranger, TransferLimits::default()).await;
        assert!(matches!(result, Err(Error::ParticipantNotFound { .. })));

        let mut missing = request(10);
        missing.ledger_id = LedgerId(42);
        let result = transfer(&store, missing, TransferLimits::default()).await;
        assert!(matches!(result, Err(Error::LedgerNotFound { .. })));

        assert!(store.list_records(LEDGER).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_closed_ledger_rejects_records() -> Result<()> {
        let store = seeded_store().await;
        store.set_status(LEDGER, LedgerStatus::Finished).await;

        let result = transfer(&store, request(10), TransferLimits::default()).await;
        assert!(matches!(
            result,
            Err(Error::LedgerClosed {
                status: LedgerStatus::Finished
            })
        ));

        store.set_status(LEDGER, LedgerStatus::Archived).await;
        let result = allocate(&store, LEDGER, ALICE, 10, TransferLimits::default()).await;
        assert!(matches!(
            result,
            Err(Error::LedgerClosed {
                status: LedgerStatus::Archived
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_allocate_issues_system_record() -> Result<()> {
        let store = seeded_store().await;
        let record = allocate(&store, LEDGER, BOB, 2000, TransferLimits::default()).await?;
        assert!(record.is_allocation());
        assert_eq!(record.to, BOB);

        let result = allocate(&store, LEDGER, ParticipantId(7), 10, TransferLimits::default()).await;
        assert!(matches!(result, Err(Error::ParticipantNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_sender_may_go_negative() -> Result<()> {
        let store = seeded_store().await;
        let record = transfer(&store, request(10_000), TransferLimits::default()).await?;
        assert_eq!(record.amount, 10_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_matches_ledger_identity() -> Result<()> {
        let store = InMemoryLedger::new();
        store.set_status(LEDGER, LedgerStatus::Active).await;
        let mut owner = Participant::new(ParticipantId(10), "Owner");
        owner.ledger_identity = Some(ALICE);
        store.seat(LEDGER, owner).await?;
        store.seat(LEDGER, Participant::new(BOB, "Bob")).await?;

        transfer(&store, request(25), TransferLimits::default()).await?;
        Ok(())
    }
    #[tokio::test]
    async fn test_transfers_that_would_overflow_replay_are_rejected() -> Result<()> {
        let store = seeded_store().await;
        allocate(&store, LEDGER, ALICE, 2000, TransferLimits::default()).await?;
        allocate(&store, LEDGER, BOB, 2000, TransferLimits::default()).await?;

        let result = transfer(&store, request(i64::MAX), TransferLimits::default()).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: i64::MAX })));

        transfer(&store, request(i64::MAX - 4000), TransferLimits::default()).await?;
        let result = transfer(&store, request(1), TransferLimits::default()).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: 1 })));
        let result = allocate(&store, LEDGER, ALICE, 1, TransferLimits::default()).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: 1 })));

        let current = standings::ledger_standings(&store, LEDGER).await?;
        assert!(current.is_balanced());
        assert_eq!(current.total_allocated, 4000);
        assert_eq!(current.balances[0].current_balance, 6000 - i64::MAX);
        assert_eq!(current.balances[1].current_balance, i64::MAX - 2000);
        assert_eq!(current.balances[1].net_result, i64::MAX - 4000);
        Ok(())
    }

    /// Finishes the ledger while the roster is read, after the status check passed.
    struct FinishesInMemory<'a> {
        inner: &'a InMemoryLedger,
    }

    impl LedgerStore for FinishesInMemory<'_> {
        async fn list_records(&self, ledger_id: LedgerId) -> Result<Vec<TransferRecord>> {
            self.inner.list_records(ledger_id).await
        }

        async fn append_record(&self, record: NewTransfer) -> Result<TransferRecord> {
            self.inner.append_record(record).await
        }

        async fn ledger_status(&self, ledger_id: LedgerId) -> Result<Option<LedgerStatus>> {
            self.inner.ledger_status(ledger_id).await
        }
    }

    impl RosterProvider for FinishesInMemory<'_> {
        async fn list_participants(&self, ledger_id: LedgerId) -> Result<Vec<Participant>> {
            self.inner.set_status(ledger_id, LedgerStatus::Finished).await;
            self.inner.list_participants(ledger_id).await
        }
    }

    /// Same as [`FinishesInMemory`], finishing through the ledger lifecycle on SQLite.
    struct FinishesInDatabase<'a> {
        db: &'a DatabaseConnection,
    }

    impl LedgerStore for FinishesInDatabase<'_> {
        async fn list_records(&self, ledger_id: LedgerId) -> Result<Vec<TransferRecord>> {
            self.db.list_records(ledger_id).await
        }

        async fn append_record(&self, record: NewTransfer) -> Result<TransferRecord> {
            self.db.append_record(record).await
        }

        async fn ledger_status(&self, ledger_id: LedgerId) -> Result<Option<LedgerStatus>> {
            self.db.ledger_status(ledger_id).await
        }
    }

    impl RosterProvider for FinishesInDatabase<'_> {
        async fn list_participants(&self, ledger_id: LedgerId) -> Result<Vec<Participant>> {
            ledger::set_ledger_status(self.db, ledger_id, LedgerStatus::Finished).await?;
            self.db.list_participants(ledger_id).await
        }
    }

    #[tokio::test]
    async fn test_ledger_finished_after_checks_rejects_append() -> Result<()> {
        let inner = seeded_store().await;
        let store = FinishesInMemory { inner: &inner };

        let result = transfer(&store, request(10), TransferLimits::default()).await;
        assert!(matches!(
            result,
            Err(Error::LedgerClosed {
                status: LedgerStatus::Finished
            })
        ));
        assert!(inner.list_records(LEDGER).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_finished_after_checks_rejects_database_append() -> Result<()> {
        let (db, created, owner) = setup_with_ledger().await?;
        let guest = join_test_participant(&db, created.id, "guest").await?;
        let ledger_id = LedgerId(created.id);
        let store = FinishesInDatabase { db: &db };

        let result = transfer(
            &store,
            TransferRequest {
                ledger_id,
                from: ParticipantId(owner.id),
                to: ParticipantId(guest.id),
                amount: 10,
                transfer_type: TransferType::Loan,
            },
            TransferLimits::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::LedgerClosed {
                status: LedgerStatus::Finished
            })
        ));
        // Only the two seat allocations
        assert_eq!(db.list_records(ledger_id).await?.len(), 2);
        Ok(())
    }
}
