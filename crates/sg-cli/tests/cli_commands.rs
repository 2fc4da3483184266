//! Runs the `sg` binary against a temporary project

use std::path::Path;
use std::process::{Command, Output};

const CONFIG: &str = r#"
engine: sqlite
database:
  path: target.db
  name: app
policy:
  rules:
    - type: statement.where.require
      level: ERROR
    - type: table.require-pk
      level: WARNING
"#;

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let config = CONFIG.replace(
        "target.db",
        dir.path().join("target.db").to_str().unwrap(),
    );
    std::fs::write(dir.path().join("schemagate.yml"), config).unwrap();
    dir
}

fn sg(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sg"))
        .arg("--project-dir")
        .arg(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_check_clean_sql_passes() {
    let dir = project();
    let output = sg(
        dir.path(),
        &["check", "--sql", "CREATE TABLE book (id INTEGER PRIMARY KEY)"],
    );
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("0 error(s), 0 warning(s)"));
}

#[test]
fn test_check_error_advice_fails() {
    let dir = project();
    let output = sg(
        dir.path(),
        &["check", "--sql", "DELETE FROM book", "--output", "json"],
    );
    assert_eq!(output.status.code(), Some(1));

    let advices: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(advices[0]["title"], "statement.where.require");
    assert_eq!(advices[0]["content"], "\"DELETE FROM book\" requires WHERE clause");
}

#[test]
fn test_check_single_rule_warning_passes() {
    let dir = project();
    let output = sg(
        dir.path(),
        &[
            "check",
            "--sql",
            "SELECT * FROM t WHERE a LIKE '%abc'",
            "--rule",
            "statement.where.no-leading-wildcard-like",
            "--level",
            "warning",
        ],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("uses leading wildcard LIKE"));
}

#[test]
fn test_migrate_then_history() {
    let dir = project();
    let output = sg(
        dir.path(),
        &[
            "migrate",
            "--version",
            "1.0.0",
            "--sql",
            "CREATE TABLE book (id INTEGER PRIMARY KEY)",
            "--description",
            "create book",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("Applied MIGRATE 1.0.0 to app"));

    let output = sg(dir.path(), &["history", "--output", "json"]);
    assert!(output.status.success());
    let history: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["status"], "DONE");
    assert_eq!(history[0]["version"], "1.0.0");
    assert_eq!(history[0]["description"], "create book");
}

#[test]
fn test_migrate_blocked_by_review() {
    let dir = project();
    let output = sg(
        dir.path(),
        &["migrate", "--version", "1.0.0", "--sql", "DELETE FROM book"],
    );
    assert_eq!(output.status.code(), Some(1));

    let output = sg(dir.path(), &["history"]);
    assert!(stdout(&output).contains("No migration history found."));
}

#[test]
fn test_rules_lists_engine() {
    let dir = project();
    let output = sg(dir.path(), &["rules", "--engine", "postgres"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("pg.syntax"));
    assert!(!text.contains("mysql.syntax"));
}
