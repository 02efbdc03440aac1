//! Error types for tokenizing, parsing and running queries.

use std::fmt;

use thiserror::Error;

/// No token rule matches the input at `offset`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Unexpected character '{found}' at offset {offset}")]
pub struct LexError {
    /// Byte offset into the query text
    pub offset: usize,
    pub found: char,
}

/// A single grammar violation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("at offset {offset}: {message}")]
pub struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

/// Every grammar violation found while parsing one query.
///
/// Parsing never partially succeeds: a non-empty `errors` list means no
/// expression was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub errors: Vec<SyntaxError>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(f, "{} syntax {}", self.errors.len(), noun)?;
        for err in &self.errors {
            write!(f, "\n  {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Errors surfaced by [`Query`](crate::Query) and the one-shot helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The synchronous entry point reached capabilities whose values are
    /// deferred. Use the asynchronous entry point for such contexts.
    #[error("Deferred values are not supported by run_sync (pending: {})", .pending.join(", "))]
    AsyncMisuse { pending: Vec<String> },
}

impl QueryError {
    /// True for lexer and grammar failures, i.e. the query text itself is bad.
    pub fn is_syntax(&self) -> bool {
        matches!(self, QueryError::Lex(_) | QueryError::Parse(_))
    }
}
