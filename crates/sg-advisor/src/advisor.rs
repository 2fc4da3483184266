//! The rule capability and its parsed input

use crate::context::AdvisorContext;
use crate::error::AdvisorResult;
use sg_core::{Advice, Engine, RuleKind};
use sg_sql::{ParsedStatement, SqlError, SqlParser, SqlResult};

/// A SQL script parsed once and shared by every rule that checks it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedScript {
    /// The script exactly as submitted.
    pub text: String,
    pub statements: Vec<ParsedStatement>,
}

impl ParsedScript {
    /// Parse `sql` with the grammar of `engine`.
    ///
    /// A blank script is valid and holds no statements.
    pub fn parse(engine: Engine, sql: &str) -> SqlResult<Self> {
        let statements = match SqlParser::for_engine(engine).parse_statements(sql) {
            Ok(statements) => statements,
            Err(SqlError::EmptySql) => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            text: sql.to_string(),
            statements,
        })
    }
}

/// One review rule.
///
/// Rules are stateless: they read the statements and the context and
/// return findings, in statement order. A rule never mutates the AST.
pub trait Advisor: Send + Sync {
    /// The kind this rule implements
    fn kind(&self) -> RuleKind;

    /// Check the script. Zero findings yield a single OK advice.
    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>>;
}
