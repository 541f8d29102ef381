//! Error types for the ledger

use crate::types::ParticipantId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before it touched any balance
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invariant violation (money conservation, etc.)
    ///
    /// Never caused by bad input; this means a logic defect upstream.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error signals an internal-consistency defect rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::InvariantViolation(_))
    }
}

/// Bad input shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Expense with no one to split it between
    #[error("expense of {amount} paid by {payer} has no splitters")]
    EmptySplitters {
        /// Paying participant
        payer: ParticipantId,
        /// Expense amount
        amount: Decimal,
    },

    /// Zero or negative expense amount
    #[error("expense amount {amount} paid by {payer} must be positive")]
    NonPositiveAmount {
        /// Paying participant
        payer: ParticipantId,
        /// Expense amount
        amount: Decimal,
    },

    /// Same participant named twice in one splitter list
    #[error("{splitter} appears more than once among the splitters of the expense paid by {payer}")]
    DuplicateSplitter {
        /// Paying participant
        payer: ParticipantId,
        /// Repeated splitter
        splitter: ParticipantId,
    },

    /// Blank participant name
    #[error("participant name must not be empty")]
    EmptyName,

    /// Zero or negative precision unit
    #[error("precision {0} must be positive")]
    InvalidPrecision(Decimal),

    /// Amount cannot be expressed in whole precision units
    #[error("amount {amount} is not a multiple of precision {precision}")]
    AmountNotMultipleOfPrecision {
        /// Offending amount
        amount: Decimal,
        /// Precision unit in force
        precision: Decimal,
    },

    /// Balance too large to express as a decimal
    #[error("balance of {units} units is out of range at precision {precision}")]
    BalanceOutOfRange {
        /// Balance in precision units
        units: i128,
        /// Precision unit in force
        precision: Decimal,
    },

    /// Amount too large to count in precision units
    #[error("amount {amount} is out of range at precision {precision}")]
    AmountOutOfRange {
        /// Offending amount
        amount: Decimal,
        /// Precision unit in force
        precision: Decimal,
    },
}
