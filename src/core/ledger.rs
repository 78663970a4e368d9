//! Ledger lifecycle business logic.
//!
//! Creating a ledger seats its owner and issues the owner's initial allocation;
//! joining seats a new participant and issues theirs. Both happen inside a database
//! transaction so a seat never exists without its allocation. Status changes follow
//! `active -> finished -> archived` (or straight to archived), never go back, and
//! commit in their own transaction.

use crate::{
    core::{
        store::append_in,
        types::{LedgerId, LedgerStatus, NewTransfer, ParticipantId, Party, TransferKind},
    },
    entities::{ledger, participant},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Retrieves all ledgers, ordered alphabetically by name.
pub async fn get_all_ledgers(db: &DatabaseConnection) -> Result<Vec<ledger::Model>> {
    ledger::Entity::find()
        .order_by_asc(ledger::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves ledgers that still accept transfers, ordered alphabetically by name.
pub async fn get_active_ledgers(db: &DatabaseConnection) -> Result<Vec<ledger::Model>> {
    ledger::Entity::find()
        .filter(ledger::Column::Status.eq(LedgerStatus::Active.as_str()))
        .order_by_asc(ledger::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a ledger by its exact name.
pub async fn get_ledger_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<ledger::Model>> {
    ledger::Entity::find()
        .filter(ledger::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a ledger by its unique ID.
pub async fn get_ledger_by_id(
    db: &DatabaseConnection,
    ledger_id: LedgerId,
) -> Result<Option<ledger::Model>> {
    ledger::Entity::find_by_id(ledger_id.0)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the seat a Discord user holds on a ledger, if any.
pub async fn get_participant_by_user<C>(
    db: &C,
    ledger_id: LedgerId,
    user_id: &str,
) -> Result<Option<participant::Model>>
where
    C: ConnectionTrait,
{
    participant::Entity::find()
        .filter(participant::Column::LedgerId.eq(ledger_id.0))
        .filter(participant::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Decodes the stored status of a ledger row.
pub fn ledger_status(ledger: &ledger::Model) -> Result<LedgerStatus> {
    ledger.status.parse()
}

async fn seat_participant<C>(
    conn: &C,
    ledger_id: LedgerId,
    user_id: String,
    display_name: String,
    is_owner: bool,
    initial_allocation: i64,
) -> Result<participant::Model>
where
    C: ConnectionTrait,
{
    let seat = participant::ActiveModel {
        ledger_id: Set(ledger_id.0),
        user_id: Set(user_id),
        display_name: Set(display_name),
        is_owner: Set(is_owner),
        joined_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    append_in(
        conn,
        NewTransfer {
            ledger_id,
            from: Party::SystemIssuer,
            to: ParticipantId(seat.id),
            amount: initial_allocation,
            kind: TransferKind::System,
        },
    )
    .await?;

    Ok(seat)
}

/// Creates an active ledger, seats its owner and allocates the owner's chips.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only ([`Error::InvalidName`])
/// - A ledger with the same name already exists
/// - The initial allocation is not positive
/// - A database operation fails
#[instrument(skip(db))]
pub async fn create_ledger(
    db: &DatabaseConnection,
    name: &str,
    owner_user_id: &str,
    owner_display_name: &str,
    initial_allocation: i64,
) -> Result<(ledger::Model, participant::Model)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }
    if initial_allocation <= 0 {
        return Err(Error::InvalidAmount {
            amount: initial_allocation,
        });
    }

    let txn = db.begin().await?;

    let existing = ledger::Entity::find()
        .filter(ledger::Column::Name.eq(name))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateLedger {
            name: name.to_string(),
        });
    }

    let created = ledger::ActiveModel {
        name: Set(name.to_string()),
        owner_user_id: Set(owner_user_id.to_string()),
        status: Set(LedgerStatus::Active.as_str().to_string()),
        initial_allocation: Set(initial_allocation),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let owner = seat_participant(
        &txn,
        LedgerId(created.id),
        owner_user_id.to_string(),
        owner_display_name.to_string(),
        true,
        initial_allocation,
    )
    .await?;

    txn.commit().await?;
    info!(ledger_id = created.id, "Created ledger '{}'", created.name);
    Ok((created, owner))
}

/// Seats a user on an active ledger and allocates the ledger's initial chips.
///
/// # Errors
/// Returns an error if the ledger does not exist, is not active, the user already
/// holds a seat, or a database operation fails.
#[instrument(skip(db))]
pub async fn join_ledger(
    db: &DatabaseConnection,
    ledger_id: LedgerId,
    user_id: &str,
    display_name: &str,
) -> Result<participant::Model> {
    let txn = db.begin().await?;

    let ledger = ledger::Entity::find_by_id(ledger_id.0)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::LedgerNotFound {
            name: ledger_id.to_string(),
        })?;

    let status = ledger_status(&ledger)?;
    if !status.accepts_records() {
        return Err(Error::LedgerClosed { status });
    }

    if get_participant_by_user(&txn, ledger_id, user_id)
        .await?
        .is_some()
    {
        return Err(Error::AlreadyJoined);
    }

    let seat = seat_participant(
        &txn,
        ledger_id,
        user_id.to_string(),
        display_name.to_string(),
        false,
        ledger.initial_allocation,
    )
    .await?;

    txn.commit().await?;
    info!(
        ledger_id = ledger.id,
        participant_id = seat.id,
        "'{}' joined ledger '{}'",
        seat.display_name,
        ledger.name
    );
    Ok(seat)
}

/// Moves a ledger to a new lifecycle state.
///
/// # Errors
/// Returns [`Error::InvalidStatusTransition`] for moves the lifecycle does not allow,
/// [`Error::LedgerNotFound`] for unknown ledgers, or a database error.
#[instrument(skip(db))]
pub async fn set_ledger_status(
    db: &DatabaseConnection,
    ledger_id: LedgerId,
    next: LedgerStatus,
) -> Result<ledger::Model> {
    let txn = db.begin().await?;

    let ledger = ledger::Entity::find_by_id(ledger_id.0)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::LedgerNotFound {
            name: ledger_id.to_string(),
        })?;

    let current = ledger_status(&ledger)?;
    if !current.can_transition_to(next) {
        return Err(Error::InvalidStatusTransition {
            from: current,
            to: next,
        });
    }

    let mut active: ledger::ActiveModel = ledger.into();
    active.status = Set(next.as_str().to_string());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    info!(ledger_id = updated.id, "Ledger '{}' is now {}", updated.name, next);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::store::{LedgerStore, RosterProvider};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_ledger_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_ledger(&db, "   ", "owner", "Owner", 2000).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidName { .. }));

        let result = create_ledger(&db, "Poker", "owner", "Owner", 0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0 }
        ));

        let result = create_ledger(&db, "Poker", "owner", "Owner", -100).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -100 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_ledger_seats_owner_with_allocation() -> Result<()> {
        let db = setup_test_db().await?;
        let (ledger, owner) = create_ledger(&db, "  Friday Poker ", "u1", "Alice", 2000).await?;

        assert_eq!(ledger.name, "Friday Poker");
        assert_eq!(ledger_status(&ledger)?, LedgerStatus::Active);
        assert_eq!(ledger.initial_allocation, 2000);
        assert!(owner.is_owner);
        assert_eq!(owner.user_id, "u1");

        let records = db.list_records(LedgerId(ledger.id)).await?;
        assert_eq!(records.len(), 1);
        assert!(records[0].is_allocation());
        assert_eq!(records[0].to, ParticipantId(owner.id));
        assert_eq!(records[0].amount, 2000);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_ledger_rejects_duplicate_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_ledger(&db, "Poker").await?;

        let result = create_ledger(&db, "Poker", "u2", "Bob", 1000).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::DuplicateLedger { name } if name == "Poker"
        ));
        assert_eq!(get_all_ledgers(&db).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_join_ledger() -> Result<()> {
        let (db, ledger, _) = setup_with_ledger().await?;
        let guest = join_ledger(&db, LedgerId(ledger.id), "guest", "Guest").await?;

        assert!(!guest.is_owner);
        let roster = db.list_participants(LedgerId(ledger.id)).await?;
        assert_eq!(roster.len(), 2);

        let records = db.list_records(LedgerId(ledger.id)).await?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].to, ParticipantId(guest.id));
        assert_eq!(records[1].amount, ledger.initial_allocation);

        let found = get_participant_by_user(&db, LedgerId(ledger.id), "guest").await?;
        assert_eq!(found, Some(guest));
        Ok(())
    }

    #[tokio::test]
    async fn test_join_ledger_twice_is_rejected() -> Result<()> {
        let (db, ledger, _) = setup_with_ledger().await?;
        join_ledger(&db, LedgerId(ledger.id), "guest", "Guest").await?;

        let result = join_ledger(&db, LedgerId(ledger.id), "guest", "Guest").await;
        assert!(matches!(result.unwrap_err(), Error::AlreadyJoined));

        let result = join_ledger(&db, LedgerId(ledger.id), TEST_OWNER, "Owner").await;
        assert!(matches!(result.unwrap_err(), Error::AlreadyJoined));
        assert_eq!(db.list_records(LedgerId(ledger.id)).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_join_unknown_or_closed_ledger() -> Result<()> {
        let (db, ledger, _) = setup_with_ledger().await?;

        let result = join_ledger(&db, LedgerId(999), "guest", "Guest").await;
        assert!(matches!(result.unwrap_err(), Error::LedgerNotFound { .. }));

        set_ledger_status(&db, LedgerId(ledger.id), LedgerStatus::Finished).await?;
        let result = join_ledger(&db, LedgerId(ledger.id), "guest", "Guest").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::LedgerClosed {
                status: LedgerStatus::Finished
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_lifecycle() -> Result<()> {
        let (db, ledger, _) = setup_with_ledger().await?;
        let id = LedgerId(ledger.id);

        let finished = set_ledger_status(&db, id, LedgerStatus::Finished).await?;
        assert_eq!(ledger_status(&finished)?, LedgerStatus::Finished);
        assert!(get_active_ledgers(&db).await?.is_empty());

        let result = set_ledger_status(&db, id, LedgerStatus::Active).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidStatusTransition {
                from: LedgerStatus::Finished,
                to: LedgerStatus::Active
            }
        ));

        let archived = set_ledger_status(&db, id, LedgerStatus::Archived).await?;
        assert_eq!(ledger_status(&archived)?, LedgerStatus::Archived);

        // Replay remains available on archived ledgers
        assert_eq!(db.list_records(id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_lookups() -> Result<()> {
        let db = setup_test_db().await?;
        let beta = create_test_ledger(&db, "Beta").await?;
        let alpha = create_test_ledger(&db, "Alpha").await?;

        let names: Vec<String> = get_all_ledgers(&db)
            .await?
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);

        assert_eq!(get_ledger_by_name(&db, " Beta ").await?, Some(beta));
        assert_eq!(get_ledger_by_id(&db, LedgerId(alpha.id)).await?, Some(alpha));
        assert!(get_ledger_by_name(&db, "Gamma").await?.is_none());
        Ok(())
    }
}
