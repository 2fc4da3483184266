//! sg-sql - SQL parsing layer for schemagate
//!
//! Wraps sqlparser-rs behind a per-engine dialect adapter. Parsing yields
//! each statement's AST paired with its original source text so rules can
//! quote the statement verbatim in their findings.

pub mod dialect;
pub mod error;
pub mod parser;

pub use dialect::{MySqlDialect, PostgresDialect, SqlDialect, SqliteDialect};
pub use error::{SqlError, SqlResult};
pub use parser::{ParsedStatement, SqlParser};
