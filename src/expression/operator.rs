//! Operator definitions for WHERE/HAVING expressions.

use std::fmt;

/// Operators that can appear in a boolean expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Text and membership
    Contains,
    In,
    NotIn,

    // Logical
    And,
    Or,
    Not,
}

impl Operator {
    /// Binding strength used by the postfix compiler. Higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Not => 5,
            Operator::Eq
            | Operator::Ne
            | Operator::Lt
            | Operator::Le
            | Operator::Gt
            | Operator::Ge
            | Operator::Contains
            | Operator::In
            | Operator::NotIn => 4,
            Operator::And => 2,
            Operator::Or => 1,
        }
    }

    /// Number of operands popped when evaluating this operator
    pub fn arity(&self) -> usize {
        match self {
            Operator::Not => 1,
            _ => 2,
        }
    }

    /// Match a keyword operator, ignoring case
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "AND" => Some(Operator::And),
            "OR" => Some(Operator::Or),
            "NOT" => Some(Operator::Not),
            "CONTAINS" => Some(Operator::Contains),
            "IN" => Some(Operator::In),
            _ => None,
        }
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Contains => "CONTAINS",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
