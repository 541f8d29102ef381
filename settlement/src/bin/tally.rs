//! Tally command-line binary
//!
//! Reads expense records, writes the transfers that settle them.
//!
//! Usage:
//!   tally expenses.csv transfers.csv --precision 0.05
//!   cat expenses.csv | tally --format json

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tally_settlement::{Config, OutputFormat, Precision, SettlementEngine};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "tally", version)]
#[command(about = "Split some expenses into a minimal set of transactions")]
struct Args {
    /// CSV expenses to read (payer, amount, splitters); stdin if omitted or "-"
    expenses: Option<PathBuf>,

    /// Where to write the transfers (sender, amount, recipient); stdout if omitted or "-"
    transfers: Option<PathBuf>,

    /// Smallest usable currency amount when splitting expenses [default: 0.01]
    #[arg(short, long)]
    precision: Option<Precision>,

    /// Output format: csv or json [default: csv]
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write the balance sheet to this path
    #[arg(long)]
    balances: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_json);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tally: {:#}", err);
            ExitCode::from(exit_status(&err))
        }
    }
}

/// 2 for internal-consistency errors, 1 for everything else
fn exit_status(err: &anyhow::Error) -> u8 {
    let internal = err
        .downcast_ref::<tally_settlement::Error>()
        .is_some_and(|e| e.is_internal());
    if internal {
        2
    } else {
        1
    }
}

/// Logs go to stderr; stdout may carry the transfer records
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json().with_writer(io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let engine = SettlementEngine::new(config);

    let input = open_input(args.expenses.as_deref())?;
    let report = engine.settle_reader(input)?;

    // Nothing is written until the whole plan exists and every output is open
    let balances = args
        .balances
        .as_deref()
        .map(|path| {
            File::create(path)
                .map(BufWriter::new)
                .with_context(|| format!("cannot create balances file {}", path.display()))
        })
        .transpose()?;
    let output = open_output(args.transfers.as_deref())?;

    engine.write_transfers(output, &report)?;
    if let Some(file) = balances {
        engine.write_balances(file, &report)?;
    }

    info!("Wrote {} transfers", report.transfers.len());
    Ok(())
}

/// Defaults, then config file, then environment, then flags
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env()?;

    if let Some(precision) = args.precision {
        config.ledger.precision = precision;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }

    Ok(config)
}

fn is_stdio(path: Option<&Path>) -> bool {
    path.map_or(true, |p| p.as_os_str() == "-")
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(p) if !is_stdio(path) => {
            let file = File::open(p)
                .with_context(|| format!("cannot open expenses file {}", p.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_stdio(path) => {
            let file = File::create(p)
                .with_context(|| format!("cannot create transfers file {}", p.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(io::stdout().lock())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tally").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("tally.toml");
        fs::write(
            &config_path,
            "[ledger]\nprecision = \"0.25\"\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();
        let config_arg = config_path.to_str().unwrap();

        let config = load_config(&parse(&["-c", config_arg])).unwrap();
        assert_eq!(config.ledger.precision.unit(), dec!(0.25));
        assert_eq!(config.output.format, OutputFormat::Json);

        let config = load_config(&parse(&["-c", config_arg, "-p", "0.05", "-f", "csv"])).unwrap();
        assert_eq!(config.ledger.precision.unit(), dec!(0.05));
        assert_eq!(config.output.format, OutputFormat::Csv);
    }

    #[test]
    fn test_rejects_bad_precision_flag() {
        assert!(Args::try_parse_from(["tally", "-p", "0"]).is_err());
        assert!(Args::try_parse_from(["tally", "-f", "xml"]).is_err());
    }

    #[test]
    fn test_dash_means_stdio() {
        assert!(is_stdio(None));
        assert!(is_stdio(Some(Path::new("-"))));
        assert!(!is_stdio(Some(Path::new("expenses.csv"))));

        let args = parse(&["-", "-"]);
        assert_eq!(args.expenses.as_deref(), Some(Path::new("-")));
        assert_eq!(args.transfers.as_deref(), Some(Path::new("-")));
    }

    #[test]
    fn test_run_writes_transfers_and_balances() {
        let dir = tempfile::tempdir().unwrap();
        let expenses = dir.path().join("expenses.csv");
        let transfers = dir.path().join("transfers.csv");
        let balances = dir.path().join("balances.csv");
        fs::write(&expenses, "# payer,amount,splitters\nA,10.00,A B C\n").unwrap();

        let args = parse(&[
            expenses.to_str().unwrap(),
            transfers.to_str().unwrap(),
            "--balances",
            balances.to_str().unwrap(),
        ]);
        run(&args).unwrap();

        assert_eq!(
            fs::read_to_string(&transfers).unwrap(),
            "sender,amount,recipient\nB,3.33,A\nC,3.33,A\n"
        );
        assert_eq!(
            fs::read_to_string(&balances).unwrap(),
            "participant,balance\nA,6.66\nB,-3.33\nC,-3.33\n"
        );
    }

    #[test]
    fn test_unwritable_balances_file_writes_no_transfers() {
        let dir = tempfile::tempdir().unwrap();
        let expenses = dir.path().join("expenses.csv");
        let transfers = dir.path().join("transfers.csv");
        let balances = dir.path().join("missing").join("balances.csv");
        fs::write(&expenses, "A,10.00,A B C\n").unwrap();

        let args = parse(&[
            expenses.to_str().unwrap(),
            transfers.to_str().unwrap(),
            "--balances",
            balances.to_str().unwrap(),
        ]);
        let err = run(&args).unwrap_err();

        assert_eq!(exit_status(&err), 1);
        assert!(!transfers.exists());
    }

    #[test]
    fn test_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let expenses = dir.path().join("expenses.csv");
        let transfers = dir.path().join("transfers.csv");
        fs::write(&expenses, "A,10.005,A B\n").unwrap();

        let args = parse(&[expenses.to_str().unwrap(), transfers.to_str().unwrap()]);
        let err = run(&args).unwrap_err();
        assert_eq!(exit_status(&err), 1);
        assert!(!transfers.exists());

        let missing = parse(&[dir.path().join("nope.csv").to_str().unwrap()]);
        assert_eq!(exit_status(&run(&missing).unwrap_err()), 1);

        let internal = anyhow::Error::from(tally_settlement::Error::InvariantViolation(
            "balances sum to 0.01 instead of zero".to_string(),
        ))
        .context("settling expenses");
        assert_eq!(exit_status(&internal), 2);
    }
}
