//! Error types for settlement engine

use tally_ledger::ValidationError;
use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger error (validation or balancing)
    #[error("Ledger error: {0}")]
    Ledger(#[from] tally_ledger::Error),

    /// Balances that cannot be settled (they do not sum to zero)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Malformed input record
    #[error("Invalid record on line {line}: {message}")]
    Record {
        /// 1-based input line
        line: u64,
        /// What is wrong with it
        message: String,
    },

    /// Well-formed record describing an invalid expense
    #[error("Invalid expense on line {line}: {source}")]
    InvalidExpense {
        /// 1-based input line
        line: u64,
        /// Validation failure
        source: ValidationError,
    },

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error signals an internal-consistency defect rather than bad input
    pub fn is_internal(&self) -> bool {
        match self {
            Error::InvariantViolation(_) => true,
            Error::Ledger(e) => e.is_internal(),
            _ => false,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Ledger(err.into())
    }
}
