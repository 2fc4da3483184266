use super::*;
use crate::test_utils::check_rule;
use sg_core::{AdviceStatus, Engine, PolicyRule, RuleLevel};

fn rule() -> PolicyRule {
    PolicyRule::new(RuleKind::BackwardCompatibility, RuleLevel::Warning)
}

fn codes(engine: Engine, sql: &str) -> Vec<AdviceCode> {
    check_rule(engine, &rule(), sql)
        .into_iter()
        .map(|a| a.code)
        .collect()
}

#[test]
fn test_drop_table() {
    let advices = check_rule(Engine::MySql, &rule(), "DROP TABLE user");
    assert_eq!(
        advices,
        vec![Advice::new(
            AdviceStatus::Warn,
            AdviceCode::CompatibilityDropTable,
            "schema.backward-compatibility",
            "\"DROP TABLE user\" may cause incompatibility with the existing data and code",
        )]
    );
}

#[test]
fn test_destructive_alters() {
    assert_eq!(
        codes(Engine::MySql, "DROP DATABASE shop"),
        vec![AdviceCode::CompatibilityDropDatabase]
    );
    assert_eq!(
        codes(Engine::Postgres, "ALTER TABLE t RENAME TO t2"),
        vec![AdviceCode::CompatibilityRenameTable]
    );
    assert_eq!(
        codes(Engine::Postgres, "ALTER TABLE t RENAME COLUMN a TO b"),
        vec![AdviceCode::CompatibilityRenameColumn]
    );
    assert_eq!(
        codes(Engine::MySql, "ALTER TABLE t DROP COLUMN a"),
        vec![AdviceCode::CompatibilityDropColumn]
    );
    assert_eq!(
        codes(Engine::Postgres, "ALTER TABLE t ALTER COLUMN a SET DATA TYPE bigint"),
        vec![AdviceCode::CompatibilityAlterColumn]
    );
    assert_eq!(
        codes(Engine::MySql, "ALTER TABLE t MODIFY COLUMN a bigint"),
        vec![AdviceCode::CompatibilityAlterColumn]
    );
}

#[test]
fn test_added_constraints() {
    assert_eq!(
        codes(Engine::Postgres, "ALTER TABLE t ADD CONSTRAINT pk PRIMARY KEY (id)"),
        vec![AdviceCode::CompatibilityAddPrimaryKey]
    );
    assert_eq!(
        codes(Engine::Postgres, "ALTER TABLE t ADD CONSTRAINT uk UNIQUE (a)"),
        vec![AdviceCode::CompatibilityAddUniqueKey]
    );
    assert_eq!(
        codes(Engine::Postgres, "ALTER TABLE t ADD CONSTRAINT c CHECK (a > 0)"),
        vec![AdviceCode::CompatibilityAddCheck]
    );
    assert_eq!(
        codes(Engine::Postgres, "CREATE UNIQUE INDEX uk_t_a ON t (a)"),
        vec![AdviceCode::CompatibilityAddUniqueKey]
    );
}

#[test]
fn test_additive_changes_ok() {
    let sql = "CREATE TABLE t(id int); ALTER TABLE t ADD COLUMN a int; CREATE INDEX idx_t_a ON t (a)";
    assert_eq!(codes(Engine::Postgres, sql), vec![AdviceCode::Ok]);
}

#[test]
fn test_multi_line_text_is_not_escaped() {
    let advices = check_rule(Engine::MySql, &rule(), "ALTER TABLE t\n  DROP COLUMN c");
    assert_eq!(advices[0].code, AdviceCode::CompatibilityDropColumn);
    assert_eq!(
        advices[0].content,
        "\"ALTER TABLE t\n  DROP COLUMN c\" may cause incompatibility with the existing data and code"
    );
}

#[test]
fn test_mysql_rename_table() {
    assert_eq!(
        codes(Engine::MySql, "RENAME TABLE t TO t2"),
        vec![AdviceCode::CompatibilityRenameTable]
    );

    let advices = check_rule(Engine::TiDb, &rule(), "RENAME TABLE a TO b, c TO d");
    let contents: Vec<&str> = advices.iter().map(|a| a.content.as_str()).collect();
    assert_eq!(
        contents,
        vec![
            "\"RENAME TABLE a TO b, c TO d\" may cause incompatibility with the existing data and code",
            "\"RENAME TABLE a TO b, c TO d\" may cause incompatibility with the existing data and code",
        ]
    );

    // index renames keep the data intact
    assert_eq!(
        codes(Engine::MySql, "ALTER TABLE tech_book RENAME INDEX old_index TO idx1"),
        vec![AdviceCode::Ok]
    );
}
