use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    Command::cargo_bin("tabular-ingest").unwrap()
}

#[test]
fn prints_schema_preview_and_count() {
    cli()
        .arg("tests/fixtures/people.csv")
        .assert()
        .success()
        .stdout(predicate::str::contains(" |-- id: integer (nullable = true)"))
        .stdout(predicate::str::contains("|  1|  Ada| 98.5|  true|"))
        .stdout(predicate::str::contains("Total rows: 2"))
        .stdout(predicate::str::contains("only showing").not());
}

#[test]
fn bundled_sample_is_used_without_path() {
    cli()
        .assert()
        .success()
        .stdout(predicate::str::contains("only showing top 5 rows"))
        .stdout(predicate::str::contains("Total rows: 7"));
}

#[test]
fn limit_controls_preview_size() {
    cli()
        .args(["tests/fixtures/people.csv", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("only showing top 1 row"))
        .stdout(predicate::str::contains("Grace").not());
}

#[test]
fn json_output() {
    let output = cli()
        .args(["tests/fixtures/people.csv", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["count"], 2);
    assert_eq!(doc["preview"]["rows"][1][1], "Grace");
    assert_eq!(doc["preview"]["schema"]["fields"][2]["data_type"], "float64");
}

#[test]
fn no_header_with_tab_delimiter() {
    cli()
        .args(["tests/fixtures/no_header.tsv", "--no-header", "--delimiter", "\t"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" |-- _1: boolean"))
        .stdout(predicate::str::contains("Total rows: 2"));
}

#[test]
fn malformed_input_exits_with_error() {
    cli()
        .arg("tests/fixtures/ragged.csv")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to ingest tests/fixtures/ragged.csv"))
        .stderr(predicate::str::contains("has 2 fields but 3 columns"));
}

#[test]
fn missing_file_exits_with_error() {
    cli()
        .arg("tests/fixtures/does_not_exist.csv")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("resource not found"));
}

#[test]
fn unwritable_log_file_warns_but_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("missing").join("ingest.log");

    cli()
        .arg("tests/fixtures/people.csv")
        .arg("--log-file")
        .arg(&log_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total rows: 2"))
        .stderr(predicate::str::contains("warning: cannot write log file").count(1));
}

#[test]
fn log_file_receives_ingestion_events() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("ingest.log");

    cli()
        .arg("tests/fixtures/people.csv")
        .arg("--log-file")
        .arg(&log_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("warning").not());

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("ok resource=tests/fixtures/people.csv rows=2 columns=4 header=true infer=true"));
}
