//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod ledger;
pub mod participant;
pub mod transfer_record;

// Re-export specific types to avoid conflicts
pub use ledger::{Column as LedgerColumn, Entity as Ledger, Model as LedgerModel};
pub use participant::{
    Column as ParticipantColumn, Entity as Participant, Model as ParticipantModel,
};
pub use transfer_record::{
    Column as TransferRecordColumn, Entity as TransferRecord, Model as TransferRecordModel,
};
