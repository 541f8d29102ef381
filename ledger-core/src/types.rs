//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic iteration (ordered by participant name)
//! - Exact arithmetic (Decimal for money)
//! - Validation at construction (an [`Expense`] that exists is well-formed)

use crate::error::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Participant identifier (the participant's name)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create new participant ID
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One payment event shared between a set of participants
///
/// Immutable once built; [`Expense::new`] is the only constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    payer: ParticipantId,
    amount: Decimal,
    splitters: Vec<ParticipantId>,
}

impl Expense {
    /// Create a validated expense
    ///
    /// The payer may or may not be among the splitters. Splitter order is kept:
    /// it decides who absorbs the remainder units when the amount does not
    /// divide evenly.
    pub fn new(
        payer: ParticipantId,
        amount: Decimal,
        splitters: Vec<ParticipantId>,
    ) -> Result<Self, ValidationError> {
        if payer.is_blank() {
            return Err(ValidationError::EmptyName);
        }

        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount { payer, amount });
        }

        if splitters.is_empty() {
            return Err(ValidationError::EmptySplitters { payer, amount });
        }

        let mut seen = BTreeSet::new();
        for splitter in &splitters {
            if splitter.is_blank() {
                return Err(ValidationError::EmptyName);
            }
            if !seen.insert(splitter) {
                return Err(ValidationError::DuplicateSplitter {
                    payer: payer.clone(),
                    splitter: splitter.clone(),
                });
            }
        }

        Ok(Self {
            payer,
            amount,
            splitters,
        })
    }

    /// Paying participant
    pub fn payer(&self) -> &ParticipantId {
        &self.payer
    }

    /// Total amount paid
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Participants sharing the cost, in input order
    pub fn splitters(&self) -> &[ParticipantId] {
        &self.splitters
    }
}

/// Net balance of every participant
///
/// Positive = the group owes this participant, negative = this participant
/// owes the group. Iteration is ordered by participant name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BalanceSheet {
    balances: BTreeMap<ParticipantId, Decimal>,
}

impl BalanceSheet {
    /// Create empty balance sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of a participant, if known
    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.balances.get(name).copied()
    }

    /// Set a participant's balance, registering them if needed
    pub fn set(&mut self, participant: ParticipantId, balance: Decimal) {
        self.balances.insert(participant, balance);
    }

    /// Move a participant's balance by `delta`
    pub fn adjust(&mut self, participant: &ParticipantId, delta: Decimal) {
        *self
            .balances
            .entry(participant.clone())
            .or_insert(Decimal::ZERO) += delta;
    }

    /// Iterate over (participant, balance) in name order
    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, Decimal)> + '_ {
        self.balances.iter().map(|(id, balance)| (id, *balance))
    }

    /// Number of participants
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// No participants at all
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all balances (zero for a consistent sheet)
    pub fn total(&self) -> Decimal {
        self.balances.values().copied().sum()
    }

    /// Number of participants whose balance is not zero
    pub fn non_zero_count(&self) -> usize {
        self.balances.values().filter(|b| !b.is_zero()).count()
    }

    /// Every balance is exactly zero
    pub fn is_settled(&self) -> bool {
        self.balances.values().all(|b| b.is_zero())
    }
}

impl FromIterator<(ParticipantId, Decimal)> for BalanceSheet {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, Decimal)>>(iter: I) -> Self {
        Self {
            balances: iter.into_iter().collect(),
        }
    }
}
