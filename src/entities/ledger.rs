//! Ledger entity - A group's chip ledger.
//!
//! A ledger owns a roster of participants and an append-only list of transfer
//! records. Its `status` gates whether new records may be appended.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledgers")]
pub struct Model {
    /// Unique identifier for the ledger
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name, unique across ledgers (e.g., "Friday Poker")
    #[sea_orm(unique)]
    pub name: String,
    /// Discord user ID of the creator
    pub owner_user_id: String,
    /// Lifecycle state: `"active"`, `"finished"` or `"archived"`
    pub status: String,
    /// Chips allocated to every participant when they take a seat
    pub initial_allocation: i64,
    /// When the ledger was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Ledger and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One ledger has many participants
    #[sea_orm(has_many = "super::participant::Entity")]
    Participants,
    /// One ledger has many transfer records
    #[sea_orm(has_many = "super::transfer_record::Entity")]
    TransferRecords,
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::transfer_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
