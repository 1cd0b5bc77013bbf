// Expression tokens for lexical analysis

use crate::access::Value;
use crate::expression::Operator;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Column name, table name, keyword-like word or `*`
    Identifier(String),
    /// Typed literal; `Value::List` only appears after `IN` lists are compiled
    Literal(Value),
    Operator(Operator),

    // Delimiters
    LeftParen,
    RightParen,
    Comma,
}

impl Token {
    pub fn identifier(name: impl Into<String>) -> Self {
        Token::Identifier(name.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Token::Literal(value.into())
    }

    /// Identifier text, if this token is an identifier
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this token is the identifier `word`, ignoring case
    pub fn is_word(&self, word: &str) -> bool {
        self.as_identifier()
            .is_some_and(|name| name.eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Literal(Value::String(s)) => write!(f, "'{}'", s),
            Token::Literal(value) => write!(f, "{}", value),
            Token::Operator(op) => write!(f, "{}", op),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}
