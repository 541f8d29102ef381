//! End-to-end tests: expense records in, transfer records out

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;
use tally_settlement::{
    plan_settlement, BalanceSheet, Config, Error, OutputFormat, ParticipantId, Precision,
    SettlementEngine, Transfer,
};

fn run_csv(input: &str, config: Config) -> tally_settlement::Result<String> {
    let engine = SettlementEngine::new(config);
    let report = engine.settle_reader(input.as_bytes())?;

    let mut out = Vec::new();
    engine.write_transfers(&mut out, &report)?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn test_trip_expenses() {
    let input = "\
# payer,amount,splitters
alice,120.00,alice bob carol dave
bob,45.50,bob carol
carol,30.00,alice bob carol dave
# dave paid nothing
";

    let out = run_csv(input, Config::default()).unwrap();

    // alice +120 -30 -7.50 = 82.50
    // bob   +45.50 -30 -22.75 -7.50 = -14.75
    // carol +30 -30 -22.75 -7.50 = -30.25
    // dave  -30 -7.50 = -37.50
    assert_eq!(
        out,
        "sender,amount,recipient\n\
         dave,37.50,alice\n\
         carol,30.25,alice\n\
         bob,14.75,alice\n"
    );
}

#[test]
fn test_remainder_scenario() {
    let engine = SettlementEngine::new(Config::default());
    let report = engine.settle_reader("A,10.00,A B C\n".as_bytes()).unwrap();

    assert_eq!(report.balances.get("A"), Some(dec!(6.66)));
    assert_eq!(report.balances.get("B"), Some(dec!(-3.33)));
    assert_eq!(report.balances.get("C"), Some(dec!(-3.33)));
    assert_eq!(report.balances.total(), Decimal::ZERO);
}

#[test]
fn test_single_creditor_scenario() {
    let balances: BalanceSheet = [("A", dec!(10)), ("B", dec!(-6)), ("C", dec!(-4))]
        .into_iter()
        .map(|(n, b)| (ParticipantId::new(n), b))
        .collect();

    let transfers = plan_settlement(&balances).unwrap();

    assert_eq!(
        transfers,
        vec![
            Transfer::new("B".into(), dec!(6), "A".into()),
            Transfer::new("C".into(), dec!(4), "A".into()),
        ]
    );
}

#[test]
fn test_whole_unit_precision_scenario() {
    let mut config = Config::default();
    config.ledger.precision = Precision::new(dec!(1.00)).unwrap();

    let report = SettlementEngine::new(config)
        .settle_reader("X,9.00,A B C\n".as_bytes())
        .unwrap();

    assert_eq!(report.balances.get("X"), Some(dec!(9.00)));
    for name in ["A", "B", "C"] {
        assert_eq!(report.balances.get(name), Some(dec!(-3.00)));
    }
}

#[test]
fn test_empty_input_scenario() {
    let out = run_csv("", Config::default()).unwrap();
    assert_eq!(out, "sender,amount,recipient\n");

    let out = run_csv("# only a comment\n", Config::default()).unwrap();
    assert_eq!(out, "sender,amount,recipient\n");
}

#[test]
fn test_output_is_deterministic() {
    let input = "\
p1,17.03,p1 p2 p3 p4 p5 p6 p7
p2,3.01,p3 p4
p5,99.99,p7 p6 p5
p7,0.07,p1 p2 p3
";

    let first = run_csv(input, Config::default()).unwrap();
    let second = run_csv(input, Config::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_json_output() {
    let mut config = Config::default();
    config.output.format = OutputFormat::Json;

    let out = run_csv("A,5.00,B\n", config).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(
        value,
        serde_json::json!([{ "sender": "B", "amount": "5.00", "recipient": "A" }])
    );
}

#[test]
fn test_validation_errors_are_not_internal() {
    for input in [
        "A,10.005,A B\n",
        "A,0,B\n",
        "A,1.00,B B\n",
        "A,1.00\n",
        "A,abc,B\n",
        "A,1.00,\n",
    ] {
        let err = run_csv(input, Config::default()).unwrap_err();
        assert!(!err.is_internal(), "{input:?} gave internal error {err}");
    }
}

#[test]
fn test_unbalanced_sheet_is_internal() {
    let balances: BalanceSheet = [(ParticipantId::new("A"), dec!(1.00))]
        .into_iter()
        .collect();
    let err = plan_settlement(&balances).unwrap_err();

    assert!(matches!(err, Error::InvariantViolation(_)));
    assert!(err.is_internal());
}

#[test]
fn test_config_file_drives_engine() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[ledger]\nprecision = \"0.05\"\n\n[records]\ncomment_prefix = \";\"\n"
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    let out = run_csv("; note\nA,1.00,A B C\n", config.clone()).unwrap();

    // 20 nickels / 3 = 7, 7, 6 -> A +0.65, B -0.35, C -0.30
    assert_eq!(out, "sender,amount,recipient\nB,0.35,A\nC,0.30,A\n");

    let err = run_csv("A,1.02,B\n", config).unwrap_err();
    assert!(!err.is_internal());
}
