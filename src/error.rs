//! Query error types.
//!
//! Only structural problems are errors: bad characters, bad grammar and
//! unknown tables. Type mismatches met while evaluating rows resolve to a
//! default result instead and never show up here.

use thiserror::Error;

/// Errors that abort a query before it produces any rows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Unexpected character '{ch}' at position {position} in '{input}'")]
    Lexical {
        ch: char,
        position: usize,
        input: String,
    },

    #[error("Unterminated string literal starting at position {position} in '{input}'")]
    UnterminatedString { position: usize, input: String },

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Unknown table '{0}'")]
    UnknownTable(String),
}

impl QueryError {
    pub fn syntax(message: impl Into<String>) -> Self {
        QueryError::Syntax(message.into())
    }

    /// Lexical errors come from the tokenizer, everything else from later stages
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            QueryError::Lexical { .. } | QueryError::UnterminatedString { .. }
        )
    }
}

/// Result type for query compilation and execution.
pub type QueryResult<T> = Result<T, QueryError>;
