//! Main settlement engine
//!
//! Orchestrates record reading, balancing, and settlement planning.

use crate::{
    config::Config,
    netting::plan_settlement,
    records::{self, read_expenses},
    types::*,
    Error, Result,
};
use rust_decimal::Decimal;
use std::io::Read;
use tally_ledger::{compute_balances, Expense, ValidationError};
use tracing::info;

/// Settlement engine
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    /// Configuration
    config: Config,
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Configuration in force
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Settle a list of expenses
    pub fn settle(&self, expenses: &[Expense]) -> Result<SettlementReport> {
        let precision = self.config.ledger.precision;
        info!(
            "Starting settlement: {} expenses at precision {}",
            expenses.len(),
            precision
        );

        // Step 1: Balance expenses
        let balances = compute_balances(expenses, precision)?;

        // Step 2: Plan transfers
        let transfers = plan_settlement(&balances)?;

        // Step 3: Replay the plan; anything left over is a planner defect
        let mut residual = balances.clone();
        for transfer in &transfers {
            transfer.apply_to(&mut residual);
        }
        if !residual.is_settled() {
            return Err(Error::InvariantViolation(format!(
                "plan leaves {} participants unsettled",
                residual.non_zero_count()
            )));
        }

        let total_expensed = expenses.iter().try_fold(Decimal::ZERO, |total, e| {
            total
                .checked_add(e.amount())
                .ok_or_else(|| ValidationError::AmountOutOfRange {
                    amount: e.amount(),
                    precision: precision.unit(),
                })
        })?;

        let report = SettlementReport {
            precision,
            expense_count: expenses.len(),
            total_expensed,
            balances,
            transfers,
        };

        let stats = report.stats();
        info!(
            "Settlement complete: {} participants, {} transfers (bound {}), {} moved",
            stats.participant_count,
            stats.transfer_count,
            stats.transfer_bound,
            stats.total_transferred
        );

        Ok(report)
    }

    /// Read expense records and settle them
    pub fn settle_reader<R: Read>(&self, reader: R) -> Result<SettlementReport> {
        let expenses = read_expenses(reader, &self.config.records)?;
        self.settle(&expenses)
    }

    /// Write a report's transfers in the configured format
    pub fn write_transfers<W: std::io::Write>(
        &self,
        writer: W,
        report: &SettlementReport,
    ) -> Result<()> {
        records::write_transfers(writer, &report.transfers, self.config.output.format)
    }

    /// Write a report's balance sheet in the configured format
    pub fn write_balances<W: std::io::Write>(
        &self,
        writer: W,
        report: &SettlementReport,
    ) -> Result<()> {
        records::write_balances(writer, &report.balances, self.config.output.format)
    }
}
