//! Tally Settlement Engine
//!
//! Turns net balances into the transfers that settle them.
//!
//! # Architecture
//!
//! One run goes through three stages:
//!
//! 1. **Collection**: Read expense records (CSV, comment rows skipped)
//! 2. **Balancing**: Fold expenses into a [`BalanceSheet`] with [`tally_ledger`]
//! 3. **Settlement**: Match the largest creditor with the largest debtor until
//!    every balance is zero
//!
//! # Settlement Algorithm
//!
//! Greedy extreme-pair matching:
//! - At most `m - 1` transfers for `m` participants with a non-zero balance
//! - Ties broken by participant name, so output is reproducible
//! - Balances that do not sum to zero are an internal error, never clamped
//!
//! # Example
//!
//! ```
//! use tally_settlement::{Config, SettlementEngine};
//!
//! # fn main() -> tally_settlement::Result<()> {
//! let csv = "# payer,amount,splitters\nA,10.00,A B C\n";
//! let engine = SettlementEngine::new(Config::default());
//!
//! let report = engine.settle_reader(csv.as_bytes())?;
//! assert_eq!(report.transfers.len(), 2);
//! assert!(report.transfers.iter().all(|t| t.recipient.as_str() == "A"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod netting;
pub mod records;
pub mod error;
pub mod config;
pub mod engine;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use netting::plan_settlement;
pub use records::OutputFormat;
pub use config::Config;
pub use engine::SettlementEngine;
pub use tally_ledger::{BalanceSheet, Expense, ParticipantId, Precision};
