use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::tempdir;

fn cli(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("meter_ledger_cli").unwrap();
    cmd.env("METER_LEDGER_CLI_SCRIPT", "1")
        .env("METER_LEDGER_HOME", home)
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = tempdir().unwrap();
    let input = "config set default_rate 2\n\
                 period new Acme May 2024\n\
                 entry add North\n\
                 entry set North previous 100\n\
                 entry set North new 150\n\
                 entry pay North 80\n\
                 period save\n\
                 show\n\
                 exit\n";

    cli(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Started period `Acme_May_2024`"))
        .stdout(contains("Period `Acme_May_2024` saved"))
        .stdout(contains("Total sales: $100.00"));

    let csv = std::fs::read_to_string(home.path().join("periods").join("Acme_May_2024.csv")).unwrap();
    assert!(csv.contains("North,100,150,2,80,50,100,20"));
}

#[test]
fn compare_reports_difference_between_periods() {
    let home = tempdir().unwrap();
    let input = "config set default_rate 2\n\
                 period new Acme March 2024\n\
                 entry add Main\n\
                 entry set Main new 250\n\
                 period save\n\
                 period new Acme April 2024\n\
                 entry add Main\n\
                 entry set Main new 310\n\
                 period save\n\
                 period list\n\
                 compare Acme_March_2024 Acme_April_2024\n";

    cli(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Acme_March_2024: $500.00"))
        .stdout(contains("Acme_April_2024: $620.00"))
        .stdout(contains("Difference: $120.00"));
}

#[test]
fn missing_period_is_reported_without_failing() {
    let home = tempdir().unwrap();
    cli(home.path())
        .write_stdin("period open Ghost_June\nshow\npreiod list\n")
        .assert()
        .success()
        .stdout(contains("No data yet for period `Ghost_June`."))
        .stdout(contains("No period open."))
        .stdout(contains("Did you mean `period`?"));
}

#[test]
fn script_output_is_plain() {
    let home = tempdir().unwrap();
    cli(home.path())
        .write_stdin("help\n")
        .assert()
        .success()
        .stdout(contains("compare"))
        .stdout(contains("\u{1b}[").not());
}
