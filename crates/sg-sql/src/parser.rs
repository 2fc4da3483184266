//! SQL parser wrapper

use crate::dialect::{MySqlDialect, PostgresDialect, SqlDialect, SqliteDialect};
use crate::error::{SqlError, SqlResult};
use sg_core::Engine;
use sqlparser::ast::Statement;
use sqlparser::tokenizer::{Location, Token, Tokenizer};

/// One parsed statement together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    /// The statement as written, trimmed, without the trailing semicolon.
    pub text: String,
    pub ast: Statement,
}

/// SQL parser that wraps sqlparser-rs with dialect support
pub struct SqlParser {
    dialect: Box<dyn SqlDialect>,
}

impl SqlParser {
    pub fn mysql() -> Self {
        Self {
            dialect: Box::new(MySqlDialect::new()),
        }
    }

    pub fn postgres() -> Self {
        Self {
            dialect: Box::new(PostgresDialect::new()),
        }
    }

    pub fn sqlite() -> Self {
        Self {
            dialect: Box::new(SqliteDialect::new()),
        }
    }

    /// Parser for the grammar spoken by `engine`.
    pub fn for_engine(engine: Engine) -> Self {
        match engine {
            Engine::MySql | Engine::TiDb => Self::mysql(),
            Engine::Postgres => Self::postgres(),
            Engine::Sqlite => Self::sqlite(),
        }
    }

    /// Parse SQL into AST statements
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        Ok(self.parse_groups(sql)?.into_iter().flatten().collect())
    }

    /// Parse SQL into ASTs grouped by source statement.
    fn parse_groups(&self, sql: &str) -> SqlResult<Vec<Vec<Statement>>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        self.dialect.parse(sql)
    }

    /// Parse SQL and pair every statement with its original text.
    ///
    /// A source statement that expands to several ASTs, such as a
    /// multi-table MySQL `RENAME TABLE`, shares its text among them. When
    /// the text cannot be split one-to-one with the source statements
    /// (e.g. bodies that embed semicolons), the AST's rendering is used.
    pub fn parse_statements(&self, sql: &str) -> SqlResult<Vec<ParsedStatement>> {
        let sql = sql.trim();
        let groups = self.parse_groups(sql)?;
        let texts = self
            .split_statements(sql)
            .filter(|texts| texts.len() == groups.len());
        if texts.is_none() {
            log::debug!(
                "Falling back to rendered SQL for {} statement(s)",
                groups.len()
            );
        }

        Ok(match texts {
            Some(texts) => texts
                .into_iter()
                .zip(groups)
                .flat_map(|(text, group)| {
                    group.into_iter().map(move |ast| ParsedStatement {
                        text: text.clone(),
                        ast,
                    })
                })
                .collect(),
            None => groups
                .into_iter()
                .flatten()
                .map(|ast| ParsedStatement {
                    text: ast.to_string(),
                    ast,
                })
                .collect(),
        })
    }

    /// Split `sql` on top-level semicolons using the dialect's tokenizer.
    ///
    /// Segments holding only whitespace or comments are skipped, matching how
    /// the parser ignores empty statements. Returns `None` if tokenizing fails.
    fn split_statements(&self, sql: &str) -> Option<Vec<String>> {
        let tokens = Tokenizer::new(self.dialect.parser_dialect(), sql)
            .tokenize_with_location()
            .ok()?;

        // (start of first content token, end location) per segment
        let mut bounds: Vec<(Location, Option<Location>)> = Vec::new();
        let mut start: Option<Location> = None;
        for token in &tokens {
            match &token.token {
                Token::SemiColon => {
                    if let Some(s) = start.take() {
                        bounds.push((s, Some(token.span.start)));
                    }
                }
                Token::Whitespace(_) | Token::EOF => {}
                _ => {
                    if start.is_none() {
                        start = Some(token.span.start);
                    }
                }
            }
        }
        if let Some(s) = start {
            bounds.push((s, None));
        }

        let mut wanted: Vec<Location> = Vec::with_capacity(bounds.len() * 2);
        for (s, e) in &bounds {
            wanted.push(*s);
            if let Some(e) = e {
                wanted.push(*e);
            }
        }
        let offsets = byte_offsets(sql, &wanted)?;

        let mut texts = Vec::with_capacity(bounds.len());
        let mut next = offsets.into_iter();
        for (_, end) in &bounds {
            let from = next.next()?;
            let to = match end {
                Some(_) => next.next()?,
                None => sql.len(),
            };
            texts.push(sql.get(from..to)?.trim().to_string());
        }
        Some(texts)
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::sqlite()
    }
}

/// Map tokenizer locations (1-based line and char column, ascending) to byte
/// offsets in `sql`. Lines advance on `\n` only, as in the tokenizer.
fn byte_offsets(sql: &str, locations: &[Location]) -> Option<Vec<usize>> {
    let mut out = Vec::with_capacity(locations.len());
    let mut pending = locations.iter().peekable();
    let (mut line, mut column) = (1u64, 1u64);

    for (idx, ch) in sql.char_indices() {
        while let Some(loc) = pending.peek() {
            if loc.line == line && loc.column == column {
                out.push(idx);
                pending.next();
            } else {
                break;
            }
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    for loc in pending {
        if loc.line == line && loc.column == column {
            out.push(sql.len());
        } else {
            return None;
        }
    }
    Some(out)
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
