//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Chip movement and standings commands
pub mod chips;

/// General utility commands
pub mod general;

/// Ledger lifecycle commands
pub mod ledger;

// Export commands
pub use chips::*;
pub use general::*;
pub use ledger::*;
