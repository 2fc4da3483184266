//! Error types for sg-sql

use thiserror::Error;

/// SQL parsing errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL parse error (S001)
    #[error("[S001] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Empty SQL (S002)
    #[error("[S002] SQL is empty")]
    EmptySql,
}

impl SqlError {
    /// The parser's own message, without code or position prefix.
    pub fn parser_message(&self) -> String {
        match self {
            SqlError::ParseError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
