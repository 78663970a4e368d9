//! Shared test utilities for Point-Hive.
//!
//! This module provides helpers for setting up test databases, seeding ledgers with
//! sensible defaults, and building transfer records for the pure replay tests.

use crate::{
    config,
    core::{
        ledger,
        types::{
            LedgerId, Participant, ParticipantId, Party, RecordId, TransferKind, TransferRecord,
            TransferType,
        },
    },
    entities,
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;

/// Discord user ID of the owner of ledgers created by [`create_test_ledger`].
pub const TEST_OWNER: &str = "owner_user";

/// Initial allocation of ledgers created by [`create_test_ledger`].
pub const TEST_ALLOCATION: i64 = 2000;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test ledger owned by [`TEST_OWNER`] with [`TEST_ALLOCATION`] chips.
pub async fn create_test_ledger(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::ledger::Model> {
    let (created, _) =
        ledger::create_ledger(db, name, TEST_OWNER, "Owner", TEST_ALLOCATION).await?;
    Ok(created)
}

/// Seats `user_id` on a ledger, using the user id as display name.
pub async fn join_test_participant(
    db: &DatabaseConnection,
    ledger_id: i64,
    user_id: &str,
) -> Result<entities::participant::Model> {
    ledger::join_ledger(db, LedgerId(ledger_id), user_id, user_id).await
}

/// Sets up a complete test environment with one ledger.
/// Returns (db, ledger, owner seat) for common test scenarios.
pub async fn setup_with_ledger() -> Result<(
    DatabaseConnection,
    entities::ledger::Model,
    entities::participant::Model,
)> {
    let db = setup_test_db().await?;
    let (created, owner) =
        ledger::create_ledger(&db, "Test Ledger", TEST_OWNER, "Owner", TEST_ALLOCATION).await?;
    Ok((db, created, owner))
}

/// Fixed timestamp `offset_secs` seconds after an arbitrary epoch.
#[must_use]
pub fn record_at(offset_secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::days(19_700) + Duration::seconds(offset_secs)
}

fn record(id: i64, from: Party, to: i64, amount: i64, kind: TransferKind) -> TransferRecord {
    TransferRecord {
        id: RecordId(id),
        ledger_id: LedgerId(1),
        from,
        to: ParticipantId(to),
        amount,
        kind,
        created_at: record_at(id),
    }
}

/// System allocation on ledger 1, created `id` seconds after the epoch.
#[must_use]
pub fn allocation(id: i64, to: i64, amount: i64) -> TransferRecord {
    record(id, Party::SystemIssuer, to, amount, TransferKind::System)
}

/// Win-tagged transfer on ledger 1.
#[must_use]
pub fn win(id: i64, from: i64, to: i64, amount: i64) -> TransferRecord {
    record(
        id,
        Party::Participant(ParticipantId(from)),
        to,
        amount,
        TransferKind::PlayerTransfer {
            transfer_type: TransferType::Win,
        },
    )
}

/// Loan-tagged transfer on ledger 1.
#[must_use]
pub fn loan(id: i64, from: i64, to: i64, amount: i64) -> TransferRecord {
    record(
        id,
        Party::Participant(ParticipantId(from)),
        to,
        amount,
        TransferKind::PlayerTransfer {
            transfer_type: TransferType::Loan,
        },
    )
}

/// Roster of regular participants from `(id, display_name)` pairs.
#[must_use]
pub fn roster(entries: &[(i64, &str)]) -> Vec<Participant> {
    entries
        .iter()
        .map(|&(id, name)| Participant::new(ParticipantId(id), name))
        .collect()
}
