//! Filter operator implementation.
//!
//! Keeps the rows that satisfy either a list of `(column, operator, value)`
//! conditions, all combined with AND, or a compiled WHERE/HAVING expression.
//! Conditions never fail: a type mismatch or an unknown operator symbol
//! simply makes the condition false for that row.

use crate::access::{Fields, Value};
use crate::executor::Pipeline;
use crate::sql::CompiledExpression;
use std::cmp::Ordering;

/// Operators accepted in a [`Condition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Contains,
    In,
    NotIn,
}

impl ConditionOp {
    /// Parse an operator symbol. Word operators ignore case.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim().to_ascii_lowercase().as_str() {
            "=" => Some(ConditionOp::Eq),
            "!=" => Some(ConditionOp::Ne),
            ">" => Some(ConditionOp::Gt),
            "<" => Some(ConditionOp::Lt),
            ">=" => Some(ConditionOp::Ge),
            "<=" => Some(ConditionOp::Le),
            "contains" => Some(ConditionOp::Contains),
            "in" => Some(ConditionOp::In),
            "not in" => Some(ConditionOp::NotIn),
            _ => None,
        }
    }

    /// Apply the operator to a row value and the condition's operand
    pub fn apply(&self, actual: &Value, expected: &Value) -> bool {
        match self {
            ConditionOp::Eq => actual == expected,
            ConditionOp::Ne => actual != expected,
            ConditionOp::Gt => numeric_cmp(actual, expected) == Some(Ordering::Greater),
            ConditionOp::Lt => numeric_cmp(actual, expected) == Some(Ordering::Less),
            ConditionOp::Ge => {
                matches!(numeric_cmp(actual, expected), Some(Ordering::Greater | Ordering::Equal))
            }
            ConditionOp::Le => {
                matches!(numeric_cmp(actual, expected), Some(Ordering::Less | Ordering::Equal))
            }
            ConditionOp::Contains => {
                matches!(actual, Value::String(_)) && actual.contains_text(expected)
            }
            ConditionOp::In => actual.is_contained_in(expected),
            ConditionOp::NotIn => {
                matches!(expected, Value::List(_)) && !actual.is_contained_in(expected)
            }
        }
    }
}

/// Ordering between two numbers; anything non-numeric is unordered
fn numeric_cmp(actual: &Value, expected: &Value) -> Option<Ordering> {
    if actual.is_numeric() && expected.is_numeric() {
        actual.compare(expected)
    } else {
        None
    }
}

/// One `(column, operator, value)` filter condition.
///
/// The operator is kept as written so an unrecognised symbol can fail the
/// row instead of the whole query.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: String,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        }
    }

    /// Evaluate the condition against one row
    pub fn matches<R: Fields + ?Sized>(&self, row: &R) -> bool {
        let Some(op) = ConditionOp::from_symbol(&self.op) else {
            return false;
        };
        let actual = row.field(&self.column).unwrap_or(&Value::Null);
        op.apply(actual, &self.value)
    }
}

impl<R: Fields + Clone> Pipeline<R> {
    /// Keep rows matching every condition
    pub fn filter(&self, conditions: &[Condition]) -> Self {
        self.iter()
            .filter(|row| conditions.iter().all(|c| c.matches(*row)))
            .cloned()
            .collect()
    }

    /// Same semantics as [`Pipeline::filter`]; meant for grouped pipelines
    /// whose rows expose `COUNT` and `SUM_<col>` style fields.
    pub fn having(&self, conditions: &[Condition]) -> Self {
        self.filter(conditions)
    }

    /// Keep rows for which a compiled expression evaluates to true
    pub fn filter_expression(&self, expr: &CompiledExpression) -> Self {
        self.iter().filter(|row| expr.matches(*row)).cloned().collect()
    }
}
