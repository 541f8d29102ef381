//! Settlement planning
//!
//! Implements greedy extreme-pair matching over net balances.
//!
//! # Algorithm
//!
//! 1. Check the balances sum to zero
//! 2. Pick the participant owed the most and the one owing the most
//! 3. Transfer the smaller of the two amounts from debtor to creditor
//! 4. Repeat until every balance is zero
//!
//! Each round zeroes at least one participant, so `m` non-zero balances take
//! at most `m - 1` transfers.
//!
//! # Example
//!
//! ```text
//! Net positions:
//!   A: +10 (owed)
//!   B:  -6 (owes)
//!   C:  -4 (owes)
//!
//! Transfers:
//!   B pays A: 6
//!   C pays A: 4
//! ```
//!
//! # Ties
//!
//! Among equal maxima (or equal minima) the participant whose name sorts
//! first wins. Names compare byte-wise.

use crate::{types::*, Error, Result};
use rust_decimal::Decimal;
use tally_ledger::{BalanceSheet, ParticipantId};
use tracing::{debug, info};

/// Plan the transfers that bring every balance to zero
///
/// Applying the returned transfers in order settles `balances` exactly. Fails
/// with [`Error::InvariantViolation`] if the balances do not sum to zero.
pub fn plan_settlement(balances: &BalanceSheet) -> Result<Vec<Transfer>> {
    let total = balances.total();
    if !total.is_zero() {
        return Err(Error::InvariantViolation(format!(
            "balances sum to {} instead of zero",
            total
        )));
    }

    let mut working = balances.clone();
    let bound = working.non_zero_count().saturating_sub(1);
    let mut transfers = Vec::with_capacity(bound);

    while !working.is_settled() {
        let (Some((creditor, owed)), Some((debtor, owes))) =
            (largest_creditor(&working), largest_debtor(&working))
        else {
            return Err(Error::InvariantViolation(
                "unsettled balance sheet has no participants".to_string(),
            ));
        };

        if owed <= Decimal::ZERO || owes >= Decimal::ZERO {
            return Err(Error::InvariantViolation(format!(
                "cannot settle: {} has {} with no counterparty",
                if owed > Decimal::ZERO { &creditor } else { &debtor },
                if owed > Decimal::ZERO { owed } else { owes },
            )));
        }

        if transfers.len() >= bound {
            return Err(Error::InvariantViolation(format!(
                "settlement did not finish within {} transfers",
                bound
            )));
        }

        let transfer = Transfer::new(debtor, owed.min(-owes), creditor);
        debug!(
            sender = %transfer.sender,
            recipient = %transfer.recipient,
            amount = %transfer.amount,
            "Planned transfer"
        );

        transfer.apply_to(&mut working);
        transfers.push(transfer);
    }

    info!(
        "Settlement planned: {} participants, {} transfers",
        balances.non_zero_count(),
        transfers.len()
    );

    Ok(transfers)
}

/// Participant with the highest balance, first by name on ties
fn largest_creditor(sheet: &BalanceSheet) -> Option<(ParticipantId, Decimal)> {
    pick(sheet, |candidate, best| candidate > best)
}

/// Participant with the lowest balance, first by name on ties
fn largest_debtor(sheet: &BalanceSheet) -> Option<(ParticipantId, Decimal)> {
    pick(sheet, |candidate, best| candidate < best)
}

// Iteration is in name order, so keeping the first strict winner breaks ties
// toward the smaller name.
fn pick(
    sheet: &BalanceSheet,
    beats: impl Fn(Decimal, Decimal) -> bool,
) -> Option<(ParticipantId, Decimal)> {
    let mut best: Option<(&ParticipantId, Decimal)> = None;

    for (id, balance) in sheet.iter() {
        match best {
            Some((_, current)) if !beats(balance, current) => {}
            _ => best = Some((id, balance)),
        }
    }

    best.map(|(id, balance)| (id.clone(), balance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sheet(entries: &[(&str, Decimal)]) -> BalanceSheet {
        entries
            .iter()
            .map(|(name, balance)| (ParticipantId::new(*name), *balance))
            .collect()
    }

    fn transfer(sender: &str, amount: Decimal, recipient: &str) -> Transfer {
        Transfer::new(sender.into(), amount, recipient.into())
    }

    #[test]
    fn test_single_creditor() {
        let balances = sheet(&[("A", dec!(10)), ("B", dec!(-6)), ("C", dec!(-4))]);

        let transfers = plan_settlement(&balances).unwrap();

        assert_eq!(
            transfers,
            vec![transfer("B", dec!(6), "A"), transfer("C", dec!(4), "A")]
        );
    }

    #[test]
    fn test_empty_and_settled_sheets() {
        assert!(plan_settlement(&BalanceSheet::new()).unwrap().is_empty());

        let zeros = sheet(&[("A", dec!(0.00)), ("B", Decimal::ZERO)]);
        assert!(plan_settlement(&zeros).unwrap().is_empty());
    }

    #[test]
    fn test_ties_break_by_name() {
        // B and C both owe 3.33; B sorts first
        let balances = sheet(&[("C", dec!(-3.33)), ("A", dec!(6.66)), ("B", dec!(-3.33))]);

        let transfers = plan_settlement(&balances).unwrap();

        assert_eq!(
            transfers,
            vec![transfer("B", dec!(3.33), "A"), transfer("C", dec!(3.33), "A")]
        );
    }

    #[test]
    fn test_tied_creditors_break_by_name() {
        let balances = sheet(&[("Z", dec!(5)), ("Y", dec!(5)), ("X", dec!(-10))]);

        let transfers = plan_settlement(&balances).unwrap();

        assert_eq!(
            transfers,
            vec![transfer("X", dec!(5), "Y"), transfer("X", dec!(5), "Z")]
        );
    }

    #[test]
    fn test_matches_extremes_each_round() {
        let balances = sheet(&[
            ("A", dec!(50)),
            ("B", dec!(20)),
            ("C", dec!(-30)),
            ("D", dec!(-40)),
        ]);

        let transfers = plan_settlement(&balances).unwrap();

        // max A 50 / min D -40 -> D pays 40; then A 10, B 20 / C -30
        assert_eq!(
            transfers,
            vec![
                transfer("D", dec!(40), "A"),
                transfer("C", dec!(20), "B"),
                transfer("C", dec!(10), "A"),
            ]
        );
        assert!(transfers.len() <= 3);
    }

    #[test]
    fn test_plan_settles_every_balance() {
        let balances = sheet(&[
            ("A", dec!(12.34)),
            ("B", dec!(-0.01)),
            ("C", dec!(-7.33)),
            ("D", dec!(-5.00)),
        ]);

        let transfers = plan_settlement(&balances).unwrap();

        let mut working = balances.clone();
        for t in &transfers {
            assert!(t.amount > Decimal::ZERO);
            t.apply_to(&mut working);
        }
        assert!(working.is_settled());
        assert!(transfers.len() <= balances.non_zero_count() - 1);
    }

    #[test]
    fn test_rejects_non_zero_sum() {
        let balances = sheet(&[("A", dec!(10)), ("B", dec!(-6))]);

        let err = plan_settlement(&balances).unwrap_err();

        assert!(matches!(err, Error::InvariantViolation(_)));
        assert!(err.is_internal());
    }

    #[test]
    fn test_rejects_lone_balance() {
        let balances = sheet(&[("A", dec!(0.01))]);
        assert!(matches!(
            plan_settlement(&balances),
            Err(Error::InvariantViolation(_))
        ));
    }
}
