//! Unified error types for Point-Hive.
//!
//! Every fallible operation in the crate returns [`Result`]. Domain rejections
//! (bad amounts, closed ledgers, unknown participants) carry enough context for the
//! bot layer to explain them to the user; infrastructure errors wrap their source.

use crate::core::types::LedgerStatus;
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Error reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Amount is zero, negative, or above the configured limit
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Sender and receiver of a transfer are the same participant
    #[error("A participant cannot transfer points to itself")]
    SelfTransfer,

    /// No ledger with this name or id exists
    #[error("Ledger '{name}' not found")]
    LedgerNotFound {
        /// Name or id of the missing ledger
        name: String,
    },

    /// The participant is not seated on the ledger
    #[error("Participant '{participant}' not found in this ledger")]
    ParticipantNotFound {
        /// Id or user reference of the missing participant
        participant: String,
    },

    /// The ledger no longer accepts new records
    #[error("Ledger is {status} and accepts no new transfers")]
    LedgerClosed {
        /// Current status of the ledger
        status: LedgerStatus,
    },

    /// The requested lifecycle change is not allowed
    #[error("Cannot move ledger from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status
        from: LedgerStatus,
        /// Requested status
        to: LedgerStatus,
    },

    /// The user already holds a seat on the ledger
    #[error("User is already a participant of this ledger")]
    AlreadyJoined,

    /// The ledger name is blank
    #[error("Invalid ledger name '{name}': names cannot be blank")]
    InvalidName {
        /// The rejected name, trimmed
        name: String,
    },

    /// A ledger with the same name already exists
    #[error("Ledger '{name}' already exists")]
    DuplicateLedger {
        /// The conflicting name
        name: String,
    },

    /// A stored row could not be decoded into a domain value
    #[error("Corrupt record: {message}")]
    CorruptRecord {
        /// What failed to decode
        message: String,
    },

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting failure while building a reply
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Whether this error is a rejection of user input rather than an
    /// infrastructure failure. The bot layer answers these directly.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount { .. }
                | Self::SelfTransfer
                | Self::LedgerNotFound { .. }
                | Self::ParticipantNotFound { .. }
                | Self::LedgerClosed { .. }
                | Self::InvalidStatusTransition { .. }
                | Self::AlreadyJoined
                | Self::InvalidName { .. }
                | Self::DuplicateLedger { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
