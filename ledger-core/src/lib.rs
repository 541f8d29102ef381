//! Tally Ledger Core
//!
//! Turns shared-expense records into exact per-participant balances.
//!
//! # Architecture
//!
//! - **Unit Space**: Amounts are converted to whole counts of the precision unit
//! - **Owned Store**: Balances live in one map owned by the [`Ledger`], never in
//!   the expenses themselves
//! - **Fold**: [`compute_balances`] is a left fold of [`Ledger::apply`] over expenses
//!
//! # Invariants
//!
//! - Money conservation: Σ(balances) == 0 after every expense, exactly
//! - Exact split: the shares of one expense sum to its amount, and any two
//!   shares differ by at most one precision unit
//! - Deterministic: same expenses → same balance sheet
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use tally_ledger::{compute_balances, Expense, ParticipantId, Precision};
//!
//! # fn main() -> tally_ledger::Result<()> {
//! let expense = Expense::new(
//!     ParticipantId::new("A"),
//!     Decimal::new(1000, 2),
//!     vec![ParticipantId::new("A"), ParticipantId::new("B"), ParticipantId::new("C")],
//! )?;
//!
//! let sheet = compute_balances(&[expense], Precision::default())?;
//! assert_eq!(sheet.get("A"), Some(Decimal::new(666, 2)));
//! assert_eq!(sheet.total(), Decimal::ZERO);
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
pub mod precision;
pub mod ledger;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, Result, ValidationError};
pub use types::{BalanceSheet, Expense, ParticipantId};
pub use precision::Precision;
pub use ledger::{compute_balances, Ledger};
pub use config::Config;
