//! Core types for settlement engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_ledger::{BalanceSheet, ParticipantId, Precision};

/// One settlement action: `sender` pays `amount` to `recipient`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Participant who owes money (pays)
    pub sender: ParticipantId,

    /// Amount to transfer
    pub amount: Decimal,

    /// Participant who is owed money (receives)
    pub recipient: ParticipantId,
}

impl Transfer {
    /// Create new transfer
    pub fn new(sender: ParticipantId, amount: Decimal, recipient: ParticipantId) -> Self {
        Self {
            sender,
            amount,
            recipient,
        }
    }

    /// Apply to a balance sheet: the sender's balance rises, the recipient's falls
    pub fn apply_to(&self, sheet: &mut BalanceSheet) {
        sheet.adjust(&self.sender, self.amount);
        sheet.adjust(&self.recipient, -self.amount);
    }
}

/// Result of one settlement run
#[derive(Debug, Clone, Serialize)]
pub struct SettlementReport {
    /// Precision unit used for splitting
    pub precision: Precision,

    /// Expenses processed
    pub expense_count: usize,

    /// Sum of all expense amounts
    pub total_expensed: Decimal,

    /// Net balances before settlement
    pub balances: BalanceSheet,

    /// Transfers to execute, in order
    pub transfers: Vec<Transfer>,
}

impl SettlementReport {
    /// Sum of all transfer amounts
    pub fn total_transferred(&self) -> Decimal {
        self.transfers.iter().map(|t| t.amount).sum()
    }

    /// Upper bound on the number of transfers (`m - 1`)
    pub fn transfer_bound(&self) -> usize {
        self.balances.non_zero_count().saturating_sub(1)
    }

    /// Summary statistics
    pub fn stats(&self) -> SettlementStats {
        let creditor_count = self.balances.iter().filter(|(_, b)| *b > Decimal::ZERO).count();
        let debtor_count = self.balances.iter().filter(|(_, b)| *b < Decimal::ZERO).count();

        SettlementStats {
            expense_count: self.expense_count,
            participant_count: self.balances.len(),
            creditor_count,
            debtor_count,
            transfer_count: self.transfers.len(),
            transfer_bound: self.transfer_bound(),
            total_expensed: self.total_expensed,
            total_transferred: self.total_transferred(),
        }
    }
}

/// Settlement statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementStats {
    /// Number of expenses
    pub expense_count: usize,

    /// Number of participants involved
    pub participant_count: usize,

    /// Participants owed money
    pub creditor_count: usize,

    /// Participants owing money
    pub debtor_count: usize,

    /// Number of transfers
    pub transfer_count: usize,

    /// Maximum transfers the greedy plan may need
    pub transfer_bound: usize,

    /// Total expensed amount
    pub total_expensed: Decimal,

    /// Total amount moved by transfers
    pub total_transferred: Decimal,
}
