//! SQL dialect abstraction

use sqlparser::ast::{AlterTableOperation, ObjectName, Statement};
use sqlparser::dialect::{
    Dialect, MySqlDialect as SqlParserMySql, PostgreSqlDialect as SqlParserPostgres,
    SQLiteDialect as SqlParserSqlite,
};
use sqlparser::keywords::Keyword;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::Token;

use crate::error::{SqlError, SqlResult};

/// Trait for SQL dialect implementations
pub trait SqlDialect: Send + Sync {
    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Statements the stock grammar does not accept, tried before it at the
    /// start of every statement. `Ok(None)` leaves the position untouched.
    ///
    /// One source statement may expand to several ASTs.
    fn parse_extension(&self, _parser: &mut Parser<'_>) -> Result<Option<Vec<Statement>>, ParserError> {
        Ok(None)
    }

    /// Parse SQL into AST statements, grouped by source statement.
    fn parse(&self, sql: &str) -> SqlResult<Vec<Vec<Statement>>> {
        parse_groups(self, sql).map_err(|e| {
            let msg = e.to_string();
            let (line, column) = parse_location_from_error(&msg);
            SqlError::ParseError {
                message: msg,
                line,
                column,
            }
        })
    }
}

/// Statement loop of `Parser::parse_statements`, giving the dialect's
/// extension the first look at every statement.
fn parse_groups<D: SqlDialect + ?Sized>(
    dialect: &D,
    sql: &str,
) -> Result<Vec<Vec<Statement>>, ParserError> {
    let mut parser = Parser::new(dialect.parser_dialect()).try_with_sql(sql)?;
    let mut groups = Vec::new();
    let mut expecting_delimiter = false;
    loop {
        while parser.consume_token(&Token::SemiColon) {
            expecting_delimiter = false;
        }
        if parser.peek_token().token == Token::EOF {
            break;
        }
        if expecting_delimiter {
            return parser.expected("end of statement", parser.peek_token());
        }
        let group = match dialect.parse_extension(&mut parser)? {
            Some(group) => group,
            None => vec![parser.parse_statement()?],
        };
        groups.push(group);
        expecting_delimiter = true;
    }
    Ok(groups)
}

/// Pull "Line: N, Column: M" out of a sqlparser error message.
///
/// `ParserError` only carries a string, so the position has to be recovered
/// from its text. Returns `(0, 0)` when the message has no position.
pub(crate) fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let Some(line_idx) = msg.rfind("Line: ") else {
        return (0, 0);
    };
    let rest = &msg[line_idx + "Line: ".len()..];
    let Some((line_str, after)) = rest.split_once(',') else {
        return (0, 0);
    };
    let Ok(line) = line_str.trim().parse::<usize>() else {
        return (0, 0);
    };
    let Some(col_str) = after.trim_start().strip_prefix("Column: ") else {
        return (0, 0);
    };
    let digits: String = col_str.chars().take_while(|c| c.is_ascii_digit()).collect();
    let Ok(column) = digits.parse::<usize>() else {
        return (0, 0);
    };
    (line, column)
}

/// MySQL SQL dialect, also used for TiDB
///
/// Extends the stock grammar with `RENAME TABLE a TO b [, c TO d ...]`,
/// read as one `ALTER TABLE a RENAME TO b` per pair, and with
/// `ALTER TABLE t RENAME {INDEX | KEY} old TO new`, read as a constraint
/// rename on `t`.
pub struct MySqlDialect {
    dialect: SqlParserMySql,
}

impl MySqlDialect {
    pub fn new() -> Self {
        Self {
            dialect: SqlParserMySql {},
        }
    }
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for MySqlDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn parse_extension(&self, parser: &mut Parser<'_>) -> Result<Option<Vec<Statement>>, ParserError> {
        if parser.parse_keywords(&[Keyword::RENAME, Keyword::TABLE]) {
            let pairs = parser.parse_comma_separated(parse_rename_pair)?;
            return Ok(Some(
                pairs
                    .into_iter()
                    .map(|(from, to)| rename_table(from, to))
                    .collect(),
            ));
        }
        // Falls back to the stock grammar, and its error message, on failure.
        Ok(parser.maybe_parse(parse_mysql_alter_table)?.map(|stmt| vec![stmt]))
    }
}

fn parse_rename_pair(parser: &mut Parser<'_>) -> Result<(ObjectName, ObjectName), ParserError> {
    let from = parser.parse_object_name(false)?;
    parser.expect_keyword(Keyword::TO)?;
    let to = parser.parse_object_name(false)?;
    Ok((from, to))
}

fn rename_table(from: ObjectName, to: ObjectName) -> Statement {
    Statement::AlterTable {
        name: from,
        if_exists: false,
        only: false,
        operations: vec![AlterTableOperation::RenameTable { table_name: to }],
        location: None,
        on_cluster: None,
    }
}

fn parse_mysql_alter_table(parser: &mut Parser<'_>) -> Result<Statement, ParserError> {
    parser.expect_keywords(&[Keyword::ALTER, Keyword::TABLE])?;
    let if_exists = parser.parse_keywords(&[Keyword::IF, Keyword::EXISTS]);
    let name = parser.parse_object_name(false)?;
    let operations = parser.parse_comma_separated(parse_mysql_alter_operation)?;
    Ok(Statement::AlterTable {
        name,
        if_exists,
        only: false,
        operations,
        location: None,
        on_cluster: None,
    })
}

fn parse_mysql_alter_operation(parser: &mut Parser<'_>) -> Result<AlterTableOperation, ParserError> {
    if parser.parse_keywords(&[Keyword::RENAME, Keyword::INDEX])
        || parser.parse_keywords(&[Keyword::RENAME, Keyword::KEY])
    {
        let old_name = parser.parse_identifier(false)?;
        parser.expect_keyword(Keyword::TO)?;
        let new_name = parser.parse_identifier(false)?;
        return Ok(AlterTableOperation::RenameConstraint { old_name, new_name });
    }
    parser.parse_alter_table_operation()
}

/// PostgreSQL SQL dialect
pub struct PostgresDialect {
    dialect: SqlParserPostgres,
}

impl PostgresDialect {
    pub fn new() -> Self {
        Self {
            dialect: SqlParserPostgres {},
        }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for PostgresDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }
}

/// SQLite SQL dialect
pub struct SqliteDialect {
    dialect: SqlParserSqlite,
}

impl SqliteDialect {
    pub fn new() -> Self {
        Self {
            dialect: SqlParserSqlite {},
        }
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for SqliteDialect {
    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
