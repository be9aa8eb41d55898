use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const TRIP_SCRIPT: &str = "\
# trip from the handbook
group create Trip
participant add Trip A Ann Alpha
participant add Trip B Ben Beta
participant add Trip C Cy Gamma
bill add Trip Dinner 90 2024-07-01 A
bill add Trip Taxi 50.00 2024-07-02 B percentage A=50 B=30 C=20
balances Trip
settle Trip
settle Trip pairwise
exit
";

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("xsplittr_cli").unwrap();
    cmd.env("XSPLITTR_CLI_SCRIPT", "1")
        .env("XSPLITTR_HOME", home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_settles_the_trip() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin(TRIP_SCRIPT)
        .assert()
        .success()
        .stdout(contains("Recorded `Dinner` for $90.00 paid by A (equal split)."))
        .stdout(contains("-$40.00"))
        .stdout(contains("C owes A $35.00"))
        .stdout(contains("C owes B $5.00"))
        .stdout(contains("B owes A $5.00"));

    let saved = std::fs::read_to_string(home.path().join("ledgers").join("default.json")).unwrap();
    assert!(saved.contains("\"Taxi\""));
    let config = std::fs::read_to_string(home.path().join("config.json")).unwrap();
    assert!(config.contains("\"last_opened_ledger\": \"default\""));
}

#[test]
fn ledger_survives_between_runs() {
    let home = TempDir::new().unwrap();
    cli(&home).write_stdin(TRIP_SCRIPT).assert().success();

    cli(&home)
        .write_stdin("bill list Trip\nsettle Trip\n")
        .assert()
        .success()
        .stdout(contains("Dinner"))
        .stdout(contains("C owes A $35.00"));
}

#[test]
fn rejected_bill_is_reported_and_not_saved() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin(
            "group create Trip\nparticipant add Trip A Ann Alpha\n\
             bill add Trip Lunch 20 2024-07-03 Z\n\
             bill add Trip Brunch 20 2024-07-03 A percentage A=99.99\n\
             settle Trip\n",
        )
        .assert()
        .success()
        .stdout(contains("Invalid payer"))
        .stdout(contains("99.99"))
        .stdout(contains("Everyone is settled up."));
}

#[test]
fn unknown_commands_get_a_suggestion() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("setle Trip\nversion\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `setle`"))
        .stdout(contains("Suggestion: `settle`?"))
        .stdout(contains("xsplittr"));
}

#[test]
fn usage_errors_point_to_help() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("bill add Trip\nhelp bill\n")
        .assert()
        .success()
        .stdout(contains("Usage: bill add"))
        .stdout(contains("bill recent"))
        .stdout(contains("\u{1b}[").not());
}
