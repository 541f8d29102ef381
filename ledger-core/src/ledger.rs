//! Balance engine
//!
//! Folds expenses into per-participant balances.
//!
//! # Algorithm
//!
//! For an expense of `A` paid by `P` and split between `n` participants:
//!
//! 1. Convert `A` into whole precision units (reject if not a whole number)
//! 2. Give each splitter `units / n`, and the first `units % n` splitters in
//!    list order one extra unit
//! 3. Debit each splitter its share and credit the payer the same amount
//!
//! # Example
//!
//! ```text
//! A pays 10.00 for A, B, C at precision 0.01:
//!   1000 units / 3 = 333 remainder 1
//!   shares: A 334, B 333, C 333
//!
//! Balances:
//!   A: +10.00 - 3.34 = +6.66 (owed)
//!   B: -3.33 (owes)
//!   C: -3.33 (owes)
//! ```

use crate::{
    precision::{split_units, Precision},
    types::*,
    Error, Result, ValidationError,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Owned balance store, counted in precision units
#[derive(Debug, Clone)]
pub struct Ledger {
    precision: Precision,
    units: BTreeMap<ParticipantId, i64>,
    expense_count: usize,
}

impl Ledger {
    /// Create empty ledger
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            units: BTreeMap::new(),
            expense_count: 0,
        }
    }

    /// Precision unit in force
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Number of expenses applied so far
    pub fn expense_count(&self) -> usize {
        self.expense_count
    }

    /// Per-splitter shares of an expense, in splitter order
    ///
    /// Shares are non-negative unit counts that sum to the expense amount.
    pub fn shares<'a>(&self, expense: &'a Expense) -> Result<Vec<(&'a ParticipantId, i64)>> {
        let total = self.precision.to_units(expense.amount())?;

        let split = split_units(total, expense.splitters().len()).ok_or_else(|| {
            ValidationError::EmptySplitters {
                payer: expense.payer().clone(),
                amount: expense.amount(),
            }
        })?;

        Ok(expense.splitters().iter().zip(split).collect())
    }

    /// Apply one expense
    ///
    /// Touches only the payer and the splitters. Nothing is written if the
    /// expense is rejected.
    pub fn apply(&mut self, expense: &Expense) -> Result<()> {
        let shares = self.shares(expense)?;
        let out_of_range = || ValidationError::AmountOutOfRange {
            amount: expense.amount(),
            precision: self.precision.unit(),
        };

        // Stage against a copy of the touched entries so a mid-way overflow
        // leaves the store untouched.
        let mut staged: BTreeMap<ParticipantId, i64> = BTreeMap::new();
        let current = |id: &ParticipantId, staged: &BTreeMap<ParticipantId, i64>| {
            staged
                .get(id)
                .or_else(|| self.units.get(id))
                .copied()
                .unwrap_or(0)
        };

        for (splitter, share) in &shares {
            let debited = current(splitter, &staged)
                .checked_sub(*share)
                .ok_or_else(out_of_range)?;
            staged.insert((*splitter).clone(), debited);

            let payer = expense.payer();
            let credited = current(payer, &staged)
                .checked_add(*share)
                .ok_or_else(out_of_range)?;
            staged.insert(payer.clone(), credited);
        }

        // Every balance and every partial sum of a zero-sum sheet is bounded
        // by the total owed, so that total must fit in a Decimal.
        let owed: i128 = self
            .units
            .iter()
            .filter(|(id, _)| !staged.contains_key(*id))
            .map(|(_, units)| *units)
            .chain(staged.values().copied())
            .filter(|units| *units > 0)
            .map(i128::from)
            .sum();
        self.precision.from_units(owed).map_err(|_| out_of_range())?;

        debug!(
            payer = %expense.payer(),
            amount = %expense.amount(),
            splitters = shares.len(),
            "Applied expense"
        );

        self.units.extend(staged);
        self.expense_count += 1;
        Ok(())
    }

    /// Sum of all balances in units (zero for a consistent ledger)
    pub fn total_units(&self) -> i128 {
        self.units.values().map(|u| i128::from(*u)).sum()
    }

    /// Check money conservation invariant
    ///
    /// Every expense moves exactly as much onto splitters as it takes off the
    /// payer, so the balances must sum to zero.
    pub fn check_conservation(&self) -> Result<()> {
        let total = self.total_units();
        if total != 0 {
            return Err(Error::InvariantViolation(format!(
                "balances sum to {} units of {} instead of zero",
                total,
                self.precision.unit(),
            )));
        }
        Ok(())
    }

    /// Balance sheet in decimal form
    pub fn balances(&self) -> Result<BalanceSheet> {
        self.units
            .iter()
            .map(|(id, units)| {
                let balance = self.precision.from_units(*units)?;
                Ok::<_, Error>((id.clone(), balance))
            })
            .collect()
    }
}

/// Compute every participant's net balance from a list of expenses
///
/// Participants whose balance nets out to zero are still listed. Fails with a
/// validation error on the first bad expense, or with an invariant violation
/// if the result does not sum to zero.
pub fn compute_balances(expenses: &[Expense], precision: Precision) -> Result<BalanceSheet> {
    let ledger = expenses
        .iter()
        .try_fold(Ledger::new(precision), |mut ledger, expense| {
            ledger.apply(expense)?;
            Ok::<_, Error>(ledger)
        })?;

    ledger.check_conservation()?;

    let sheet = ledger.balances()?;
    info!(
        "Balanced {} expenses across {} participants",
        ledger.expense_count(),
        sheet.len()
    );

    Ok(sheet)
}
