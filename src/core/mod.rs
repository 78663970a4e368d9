//! Core business logic - framework-agnostic ledger operations.
//!
//! The bot layer calls into these modules; nothing here depends on Discord.

/// Ledger lifecycle: create, join, finish, archive
pub mod ledger;
/// In-memory implementation of the store traits
pub mod memory;
/// Pure ledger replay engine
pub mod replay;
/// Standings, leaderboards and history
pub mod standings;
/// Storage and roster traits, `SeaORM` implementation
pub mod store;
/// Validated ingestion of allocations and transfers
pub mod transfer;
/// Domain types
pub mod types;
