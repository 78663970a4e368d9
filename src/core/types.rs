//! Domain types shared by the replay engine, the stores and the bot layer.
//!
//! Persisted rows use plain strings and nullable columns; these types are the closed,
//! typed view of them. Conversions from entity models fail with
//! [`Error::CorruptRecord`] when a stored value is outside the known vocabulary.

use crate::{
    entities::{participant, transfer_record},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Identifier of a ledger (a group's chip history)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LedgerId(pub i64);

/// Identifier of a participant slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub i64);

/// Identifier of a transfer record; also its insertion sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sender of a transfer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Party {
    /// The non-human issuer of initial allocations
    SystemIssuer,
    /// A seated participant
    Participant(ParticipantId),
}

impl Party {
    /// Decodes the nullable `from_participant_id` column. `NULL` is the system issuer.
    #[must_use]
    pub const fn from_column(value: Option<i64>) -> Self {
        match value {
            Some(id) => Self::Participant(ParticipantId(id)),
            None => Self::SystemIssuer,
        }
    }

    /// Encodes this party for the `from_participant_id` column.
    #[must_use]
    pub const fn to_column(self) -> Option<i64> {
        match self {
            Self::SystemIssuer => None,
            Self::Participant(id) => Some(id.0),
        }
    }

    /// Returns true if this party is the given participant.
    #[must_use]
    pub fn is(self, participant: ParticipantId) -> bool {
        self == Self::Participant(participant)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemIssuer => f.write_str("system"),
            Self::Participant(id) => write!(f, "participant {id}"),
        }
    }
}

/// Tag of a player-to-player transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferType {
    /// Competitive winnings, counted in net result
    Win,
    /// Casual lending, excluded from net result
    Loan,
}

impl TransferType {
    /// Column representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loan => "loan",
        }
    }
}

impl FromStr for TransferType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "win" => Ok(Self::Win),
            "loan" => Ok(Self::Loan),
            other => Err(Error::CorruptRecord {
                message: format!("unknown transfer type '{other}'"),
            }),
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a transfer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferKind {
    /// Initial allocation issued by the system
    System,
    /// Movement between two participants
    PlayerTransfer {
        /// Whether the movement is a win or a loan
        transfer_type: TransferType,
    },
}

impl TransferKind {
    /// Value stored in the `kind` column
    #[must_use]
    pub const fn kind_column(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::PlayerTransfer { .. } => "transfer",
        }
    }

    /// Value stored in the `transfer_type` column
    #[must_use]
    pub const fn transfer_type(self) -> Option<TransferType> {
        match self {
            Self::System => None,
            Self::PlayerTransfer { transfer_type } => Some(transfer_type),
        }
    }

    /// Decodes the `kind` and `transfer_type` columns.
    ///
    /// A `transfer` row without a tag predates tagging and is read as a loan, which
    /// keeps it out of net result.
    pub fn from_columns(kind: &str, transfer_type: Option<&str>) -> Result<Self> {
        match kind {
            "system" => Ok(Self::System),
            "transfer" => {
                let transfer_type = transfer_type
                    .map(TransferType::from_str)
                    .transpose()?
                    .unwrap_or(TransferType::Loan);
                Ok(Self::PlayerTransfer { transfer_type })
            }
            other => Err(Error::CorruptRecord {
                message: format!("unknown record kind '{other}'"),
            }),
        }
    }
}

/// Lifecycle state of a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerStatus {
    /// Accepts new records
    Active,
    /// Play is over; read-only
    Finished,
    /// Hidden from active lists; read-only
    Archived,
}

impl LedgerStatus {
    /// Column representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Finished => "finished",
            Self::Archived => "archived",
        }
    }

    /// Only active ledgers accept new transfer records.
    #[must_use]
    pub const fn accepts_records(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Allowed moves: active to finished, active to archived, finished to archived.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Finished | Self::Archived) | (Self::Finished, Self::Archived)
        )
    }
}

impl FromStr for LedgerStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(Self::Active),
            "finished" => Ok(Self::Finished),
            "archived" => Ok(Self::Archived),
            other => Err(Error::CorruptRecord {
                message: format!("unknown ledger status '{other}'"),
            }),
        }
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable movement of points within one ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Unique id, increasing with insertion order
    pub id: RecordId,
    /// Ledger this record belongs to
    pub ledger_id: LedgerId,
    /// Sender
    pub from: Party,
    /// Receiver
    pub to: ParticipantId,
    /// Quantity moved
    pub amount: i64,
    /// Allocation or player transfer
    pub kind: TransferKind,
    /// Creation time; replay order
    pub created_at: DateTime<Utc>,
}

impl TransferRecord {
    /// Whether this record is an initial allocation from the system issuer.
    #[must_use]
    pub fn is_allocation(&self) -> bool {
        self.kind == TransferKind::System && self.from == Party::SystemIssuer
    }
}

impl TryFrom<transfer_record::Model> for TransferRecord {
    type Error = Error;

    fn try_from(model: transfer_record::Model) -> Result<Self> {
        let kind = TransferKind::from_columns(&model.kind, model.transfer_type.as_deref())?;
        Ok(Self {
            id: RecordId(model.id),
            ledger_id: LedgerId(model.ledger_id),
            from: Party::from_column(model.from_participant_id),
            to: ParticipantId(model.to_participant_id),
            amount: model.amount,
            kind,
            created_at: model.created_at,
        })
    }
}

/// A record that has passed ingestion checks and is ready to append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTransfer {
    /// Target ledger
    pub ledger_id: LedgerId,
    /// Sender
    pub from: Party,
    /// Receiver
    pub to: ParticipantId,
    /// Quantity moved, already validated as positive
    pub amount: i64,
    /// Allocation or player transfer
    pub kind: TransferKind,
}

/// A roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Slot id
    pub id: ParticipantId,
    /// Name shown in standings
    pub display_name: String,
    /// Whether this participant created the ledger
    pub is_owner: bool,
    /// Identity used in transfer records when it differs from the slot id
    pub ledger_identity: Option<ParticipantId>,
}

impl Participant {
    /// Creates a regular (non-owner) participant whose records use its own id.
    #[must_use]
    pub fn new(id: ParticipantId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            is_owner: false,
            ledger_identity: None,
        }
    }

    /// The identity to match against `from`/`to` in transfer records.
    #[must_use]
    pub fn canonical_id(&self) -> ParticipantId {
        self.ledger_identity.unwrap_or(self.id)
    }
}

impl From<participant::Model> for Participant {
    fn from(model: participant::Model) -> Self {
        Self {
            id: ParticipantId(model.id),
            display_name: model.display_name,
            is_owner: model.is_owner,
            ledger_identity: None,
        }
    }
}

/// Replay result for one roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantBalance {
    /// Roster slot id
    pub id: ParticipantId,
    /// Name shown in standings
    pub display_name: String,
    /// Points currently held
    pub current_balance: i64,
    /// Sum of system allocations received
    pub total_allocated: i64,
    /// Sum of non-allocation points received
    pub total_received_via_transfer: i64,
    /// Sum of points sent
    pub total_sent_via_transfer: i64,
    /// Win-tagged income minus win-tagged expense
    pub net_result: i64,
    /// Loan-tagged income minus loan-tagged expense
    pub outstanding_loans: i64,
}
