/// Database configuration and connection management
pub mod database;

/// Ledger settings loading from config.toml
pub mod ledger;
