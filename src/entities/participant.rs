//! Participant entity - A seat on a ledger.
//!
//! Each Discord user holds at most one seat per ledger. Balances are not stored
//! here; they are replayed from transfer records.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Participant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    /// Unique identifier for the seat
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the ledger this seat belongs to
    pub ledger_id: i64,
    /// Discord user ID holding the seat
    pub user_id: String,
    /// Name shown in standings
    pub display_name: String,
    /// Whether this seat belongs to the ledger creator
    pub is_owner: bool,
    /// When the user took the seat
    pub joined_at: DateTimeUtc,
}

/// Defines relationships between Participant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each participant belongs to one ledger
    #[sea_orm(
        belongs_to = "super::ledger::Entity",
        from = "Column::LedgerId",
        to = "super::ledger::Column::Id"
    )]
    Ledger,
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ledger.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
