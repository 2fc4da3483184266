use super::*;
use crate::test_utils::{check_rule, make_ctx, MockCatalog};
use sg_core::{Engine, PolicyRule, RuleLevel};

const SNAKE_CASE: &str = "^[a-z]+(_[a-z]+)*$";

fn naming_rule(kind: RuleKind, format: &str) -> PolicyRule {
    PolicyRule::new(kind, RuleLevel::Warning).with_payload(serde_json::json!({ "format": format }))
}

#[test]
fn test_table_name_mismatch() {
    let advices = check_rule(
        Engine::MySql,
        &naming_rule(RuleKind::NamingTable, SNAKE_CASE),
        "CREATE TABLE techBook(id int, name varchar(255))",
    );
    assert_eq!(advices.len(), 1);
    assert_eq!(advices[0].code, AdviceCode::NamingTableConventionMismatch);
    assert_eq!(advices[0].title, "naming.table");
    assert_eq!(
        advices[0].content,
        "`techBook` mismatches table naming convention, naming format should be \"^[a-z]+(_[a-z]+)*$\""
    );
}

#[test]
fn test_table_rename_checked() {
    let advices = check_rule(
        Engine::Postgres,
        &naming_rule(RuleKind::NamingTable, SNAKE_CASE),
        "ALTER TABLE tech_book RENAME TO TechBook",
    );
    assert_eq!(advices[0].code, AdviceCode::NamingTableConventionMismatch);
    assert!(advices[0].content.starts_with("`TechBook`"));
}

#[test]
fn test_mysql_rename_table_checked() {
    let rule = naming_rule(RuleKind::NamingTable, SNAKE_CASE);
    let advices = check_rule(Engine::MySql, &rule, "RENAME TABLE tech_book TO BAD_NAME");
    assert_eq!(
        advices,
        vec![Advice::new(
            sg_core::AdviceStatus::Warn,
            AdviceCode::NamingTableConventionMismatch,
            "naming.table",
            "`BAD_NAME` mismatches table naming convention, naming format should be \"^[a-z]+(_[a-z]+)*$\"",
        )]
    );

    let advices = check_rule(Engine::MySql, &rule, "RENAME TABLE a TO a_b, c TO cD");
    assert_eq!(advices.len(), 1);
    assert!(advices[0].content.starts_with("`cD`"));
}

#[test]
fn test_format_with_backslash_is_not_escaped() {
    let advices = check_rule(
        Engine::MySql,
        &naming_rule(RuleKind::NamingTable, r"^\w+_tbl$"),
        "CREATE TABLE book(id int)",
    );
    assert_eq!(
        advices[0].content,
        r#"`book` mismatches table naming convention, naming format should be "^\w+_tbl$""#
    );
}

#[test]
fn test_table_name_ok() {
    let advices = check_rule(
        Engine::MySql,
        &naming_rule(RuleKind::NamingTable, SNAKE_CASE),
        "CREATE TABLE tech_book(id int)",
    );
    assert_eq!(advices, vec![Advice::ok()]);
}

#[test]
fn test_column_names() {
    let sql = "CREATE TABLE book(id int, creatorId int, bookName varchar(20))";
    let advices = check_rule(
        Engine::MySql,
        &naming_rule(RuleKind::NamingColumn, SNAKE_CASE),
        sql,
    );
    let contents: Vec<&str> = advices.iter().map(|a| a.content.as_str()).collect();
    assert_eq!(
        contents,
        vec![
            "`book`.`creatorId` mismatches column naming convention, naming format should be \"^[a-z]+(_[a-z]+)*$\"",
            "`book`.`bookName` mismatches column naming convention, naming format should be \"^[a-z]+(_[a-z]+)*$\"",
        ]
    );
}

#[test]
fn test_column_alter_operations() {
    let sql = "ALTER TABLE book ADD COLUMN authorId int; ALTER TABLE book RENAME COLUMN a TO b_c";
    let advices = check_rule(
        Engine::Postgres,
        &naming_rule(RuleKind::NamingColumn, SNAKE_CASE),
        sql,
    );
    assert_eq!(advices.len(), 1);
    assert!(advices[0].content.contains("`book`.`authorId`"));
}

#[test]
fn test_invalid_regex_is_error() {
    let catalog = MockCatalog::new();
    let ctx = make_ctx(&catalog).with_payload(serde_json::json!({ "format": "(" }));
    let script = ParsedScript::parse(Engine::MySql, "CREATE TABLE t(id int)").unwrap();
    let err = NamingTableAdvisor.check(&ctx, &script).unwrap_err();
    assert!(matches!(err, AdvisorError::InvalidNamingFormat { .. }));
}

#[test]
fn test_missing_payload_is_error() {
    let catalog = MockCatalog::new();
    let ctx = make_ctx(&catalog);
    let script = ParsedScript::parse(Engine::MySql, "CREATE TABLE t(id int)").unwrap();
    let err = NamingColumnAdvisor.check(&ctx, &script).unwrap_err();
    assert!(matches!(err, AdvisorError::InvalidPayload { .. }));
}
