//! Expense and transfer records
//!
//! Input is headerless CSV, one expense per row:
//!
//! ```text
//! # payer,amount,splitters
//! alice,42.10,alice bob carol
//! bob,9.00,carol
//! ```
//!
//! Splitters are separated by whitespace. Rows whose first field starts with
//! the comment prefix are skipped, as are blank rows.
//!
//! Output is CSV with a header row, or a JSON array.

use crate::{types::Transfer, Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use tally_ledger::{BalanceSheet, Expense, ParticipantId};

/// Columns of an expense row
pub const EXPENSE_COLUMNS: [&str; 3] = ["payer", "amount", "splitters"];

/// Columns of a transfer row
pub const TRANSFER_COLUMNS: [&str; 3] = ["sender", "amount", "recipient"];

/// Columns of a balance row
pub const BALANCE_COLUMNS: [&str; 2] = ["participant", "balance"];

/// Record parsing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Rows whose first field starts with this are ignored
    pub comment_prefix: String,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            comment_prefix: "#".to_string(),
        }
    }
}

/// Output record format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// Pretty-printed JSON array
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (expected csv or json)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Read expense records
pub fn read_expenses<R: Read>(reader: R, config: &RecordsConfig) -> Result<Vec<Expense>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut expenses = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if is_skipped(&record, &config.comment_prefix) {
            continue;
        }

        expenses.push(parse_expense(&record, line)?);
    }

    tracing::debug!("Read {} expense records", expenses.len());
    Ok(expenses)
}

fn is_skipped(record: &csv::StringRecord, comment_prefix: &str) -> bool {
    let first = record.get(0).unwrap_or("");
    (!comment_prefix.is_empty() && first.starts_with(comment_prefix))
        || record.iter().all(str::is_empty)
}

fn parse_expense(record: &csv::StringRecord, line: u64) -> Result<Expense> {
    if record.len() != EXPENSE_COLUMNS.len() {
        return Err(Error::Record {
            line,
            message: format!(
                "expected {} fields ({}), found {}",
                EXPENSE_COLUMNS.len(),
                EXPENSE_COLUMNS.join(", "),
                record.len()
            ),
        });
    }

    let payer = ParticipantId::new(&record[0]);
    let amount = Decimal::from_str(&record[1]).map_err(|e| Error::Record {
        line,
        message: format!("invalid amount '{}': {}", &record[1], e),
    })?;
    let splitters = record[2].split_whitespace().map(ParticipantId::new).collect();

    Expense::new(payer, amount, splitters).map_err(|source| Error::InvalidExpense { line, source })
}

/// Write transfer records
pub fn write_transfers<W: Write>(
    writer: W,
    transfers: &[Transfer],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            wtr.write_record(TRANSFER_COLUMNS)?;
            for t in transfers {
                let amount = t.amount.to_string();
                wtr.write_record([t.sender.as_str(), amount.as_str(), t.recipient.as_str()])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => write_json(writer, transfers)?,
    }
    Ok(())
}

/// Write balance records
pub fn write_balances<W: Write>(
    writer: W,
    balances: &BalanceSheet,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            wtr.write_record(BALANCE_COLUMNS)?;
            for (participant, balance) in balances.iter() {
                let balance = balance.to_string();
                wtr.write_record([participant.as_str(), balance.as_str()])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => write_json(writer, balances)?,
    }
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
