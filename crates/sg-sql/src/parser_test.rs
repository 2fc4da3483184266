use super::*;

#[test]
fn test_parse_select() {
    let parser = SqlParser::mysql();
    let stmts = parser
        .parse("SELECT id, name FROM users WHERE id = 1")
        .unwrap();
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_parse_empty() {
    let parser = SqlParser::mysql();
    assert!(matches!(parser.parse(""), Err(SqlError::EmptySql)));
    assert!(matches!(parser.parse("  \n "), Err(SqlError::EmptySql)));
}

#[test]
fn test_parse_error_keeps_parser_message() {
    let parser = SqlParser::mysql();
    let err = parser.parse("CREATE TABLE user(id);").unwrap_err();
    assert!(matches!(err, SqlError::ParseError { .. }));
    let message = err.parser_message();
    assert!(!message.starts_with("[S001]"));
    assert!(message.contains("Line: 1"), "message: {message}");
}

#[test]
fn test_for_engine_selects_grammar() {
    let sql = "RENAME TABLE a TO b";
    assert!(SqlParser::for_engine(Engine::MySql).parse(sql).is_ok());
    assert!(SqlParser::for_engine(Engine::TiDb).parse(sql).is_ok());
    assert!(SqlParser::for_engine(Engine::Postgres).parse(sql).is_err());
    assert!(SqlParser::for_engine(Engine::Sqlite).parse(sql).is_err());
}

#[test]
fn test_expanded_statement_shares_text() {
    let parser = SqlParser::mysql();
    let sql = "RENAME TABLE a TO b,\n  c TO d;\nDROP TABLE e";
    let stmts = parser.parse_statements(sql).unwrap();
    let texts: Vec<&str> = stmts.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["RENAME TABLE a TO b,\n  c TO d", "RENAME TABLE a TO b,\n  c TO d", "DROP TABLE e"]
    );
    assert_eq!(parser.parse(sql).unwrap().len(), 3);
}

#[test]
fn test_statement_text_single() {
    let parser = SqlParser::mysql();
    let stmts = parser
        .parse_statements("SELECT * FROM t WHERE a LIKE '%abc'")
        .unwrap();
    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].text, "SELECT * FROM t WHERE a LIKE '%abc'");
}

#[test]
fn test_statement_text_multiple() {
    let parser = SqlParser::mysql();
    let sql = "DELETE FROM t;\n  UPDATE t SET a = ';' WHERE id = 1;\n\nSELECT 1;";
    let stmts = parser.parse_statements(sql).unwrap();
    let texts: Vec<&str> = stmts.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "DELETE FROM t",
            "UPDATE t SET a = ';' WHERE id = 1",
            "SELECT 1"
        ]
    );
}

#[test]
fn test_statement_text_skips_comment_only_segments() {
    let parser = SqlParser::postgres();
    let sql = "-- leading\nDROP TABLE a; -- trailing\n";
    let stmts = parser.parse_statements(sql).unwrap();
    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].text, "DROP TABLE a");
}

#[test]
fn test_statement_text_preserves_original_spelling() {
    let parser = SqlParser::mysql();
    let stmts = parser.parse_statements("delete   from T").unwrap();
    assert_eq!(stmts[0].text, "delete   from T");
}

#[test]
fn test_statement_text_multibyte() {
    let parser = SqlParser::postgres();
    let stmts = parser
        .parse_statements("SELECT 'é'; SELECT 'ü' AS x")
        .unwrap();
    assert_eq!(stmts[0].text, "SELECT 'é'");
    assert_eq!(stmts[1].text, "SELECT 'ü' AS x");
}
