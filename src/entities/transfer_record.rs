//! Transfer record entity - An immutable movement of chips.
//!
//! Rows are inserted once and never updated or deleted. `from_participant_id` is
//! `NULL` for allocations issued by the system; `transfer_type` is only set when
//! `kind` is `"transfer"`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transfer record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfer_records")]
pub struct Model {
    /// Unique identifier, increasing with insertion order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the ledger this record belongs to
    pub ledger_id: i64,
    /// Sending participant, `None` for the system issuer
    pub from_participant_id: Option<i64>,
    /// Receiving participant
    pub to_participant_id: i64,
    /// Chips moved, always positive
    pub amount: i64,
    /// Record kind: `"system"` or `"transfer"`
    pub kind: String,
    /// Transfer tag: `"win"` or `"loan"`
    pub transfer_type: Option<String>,
    /// When the record was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `TransferRecord` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one ledger
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
