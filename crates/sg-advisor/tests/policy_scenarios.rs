//! End-to-end review scenarios through the public API

use sg_advisor::test_utils::{test_namespace, MockCatalog};
use sg_advisor::{summarize, AdvisorContext, PolicyChecker, Registry};
use sg_core::{AdviceCode, AdviceStatus, Engine, Plan, Policy, PolicyRule, RuleKind, RuleLevel};

fn review_policy() -> Policy {
    let yaml = r#"
rules:
  - type: mysql.syntax
    level: ERROR
  - type: engine.mysql.use-innodb
    level: ERROR
  - type: naming.table
    level: WARNING
    payload:
      format: "^[a-z]+(_[a-z]+)*$"
  - type: naming.index.idx
    level: WARNING
    payload:
      format: "^idx_{{table}}_{{column_list}}$"
  - type: table.require-pk
    level: WARNING
  - type: column.required
    level: WARNING
    payload:
      columnList: [id, created_ts]
  - type: statement.where.require
    level: ERROR
"#;
    let policy: Policy = serde_yaml::from_str(yaml).unwrap();
    policy.validate().unwrap();
    policy
}

#[test]
fn test_clean_migration_summarizes_to_ok() {
    let registry = Registry::with_defaults().unwrap();
    let checker = PolicyChecker::new(&registry, Plan::Team);
    let catalog = MockCatalog::new();
    let ctx = AdvisorContext::new(test_namespace(), &catalog);

    let sql = "CREATE TABLE book (
        id INT PRIMARY KEY,
        created_ts BIGINT NOT NULL,
        INDEX idx_book_created_ts (created_ts)
    ) ENGINE = InnoDB;
    UPDATE book SET created_ts = 0 WHERE id = 1;";

    let advices = checker
        .check(Engine::MySql, Some(&review_policy()), &ctx, sql)
        .unwrap();
    assert_eq!(advices.len(), 7);
    assert!(advices.iter().all(|a| a.is_ok()));
    assert_eq!(summarize(advices).len(), 1);
}

#[test]
fn test_violations_reported_per_rule() {
    let registry = Registry::with_defaults().unwrap();
    let checker = PolicyChecker::new(&registry, Plan::Team);
    let catalog = MockCatalog::new();
    let ctx = AdvisorContext::new(test_namespace(), &catalog).with_charset(Some("utf8mb4".into()));

    let sql = "CREATE TABLE BookShelf (name VARCHAR(20), INDEX shelf_name (name)) ENGINE = MyISAM;
    DELETE FROM BookShelf;";

    let findings = summarize(
        checker
            .check(Engine::TiDb, Some(&review_policy()), &ctx, sql)
            .unwrap(),
    );
    let shape: Vec<(AdviceStatus, AdviceCode)> =
        findings.iter().map(|a| (a.status, a.code)).collect();
    assert_eq!(
        shape,
        vec![
            (AdviceStatus::Error, AdviceCode::NotInnoDBEngine),
            (AdviceStatus::Warn, AdviceCode::NamingTableConventionMismatch),
            (AdviceStatus::Warn, AdviceCode::NamingIndexConventionMismatch),
            (AdviceStatus::Warn, AdviceCode::TableNoPK),
            (AdviceStatus::Warn, AdviceCode::NoRequiredColumn),
            (AdviceStatus::Error, AdviceCode::StatementNoWhere),
        ]
    );
    assert_eq!(
        findings[4].content,
        "Table `BookShelf` requires columns: created_ts, id"
    );
    assert_eq!(
        findings[5].content,
        "\"DELETE FROM BookShelf\" requires WHERE clause"
    );
}

#[test]
fn test_rule_for_other_engine_is_not_fatal() {
    let registry = Registry::with_defaults().unwrap();
    let checker = PolicyChecker::new(&registry, Plan::Team);
    let catalog = MockCatalog::new();
    let ctx = AdvisorContext::new(test_namespace(), &catalog);
    let policy = Policy::new(vec![
        PolicyRule::new(RuleKind::PostgresSyntax, RuleLevel::Error),
        PolicyRule::new(RuleKind::StatementNoSelectAll, RuleLevel::Error),
    ]);

    let advices = checker
        .check(Engine::MySql, Some(&policy), &ctx, "SELECT id FROM t WHERE id = 1")
        .unwrap();
    assert_eq!(advices.len(), 2);
    assert_eq!(advices[0].code, AdviceCode::Unsupported);
    assert_eq!(advices[0].status, AdviceStatus::Warn);
    assert!(advices[1].is_ok());
}
