//! Postfix expression evaluation.
//!
//! Runs a compiled expression against a single row (or group record) with
//! an operand stack. Evaluation never fails: type mismatches make the
//! affected comparison false.

use crate::access::{Fields, Value};
use crate::expression::Operator;
use crate::sql::{CompiledExpression, Token};
use std::cmp::Ordering;

/// Evaluator for compiled expressions
pub struct ExpressionEvaluator<'a, R: Fields + ?Sized> {
    /// The row column references are resolved against
    row: &'a R,
}

impl<'a, R: Fields + ?Sized> ExpressionEvaluator<'a, R> {
    pub fn new(row: &'a R) -> Self {
        Self { row }
    }

    /// Evaluate an expression and return the value left on top of the stack.
    /// An empty expression evaluates to NULL.
    pub fn evaluate(&self, expr: &CompiledExpression) -> Value {
        let mut stack: Vec<Value> = Vec::new();

        for token in expr.tokens() {
            match token {
                Token::Literal(value) => stack.push(value.clone()),
                Token::Identifier(column) => stack.push(self.row.field_or_null(column)),
                Token::Operator(Operator::Not) => {
                    let operand = stack.pop().unwrap_or(Value::Null);
                    stack.push(Value::Boolean(!operand.is_truthy()));
                }
                Token::Operator(op) => {
                    // Both operands are always evaluated; AND/OR do not short-circuit
                    let right = stack.pop().unwrap_or(Value::Null);
                    let left = stack.pop().unwrap_or(Value::Null);
                    stack.push(Value::Boolean(evaluate_binary_op(*op, &left, &right)));
                }
                // Parentheses and commas never survive compilation
                Token::LeftParen | Token::RightParen | Token::Comma => {}
            }
        }

        stack.pop().unwrap_or(Value::Null)
    }
}

/// Apply a binary operator to two operands
pub fn evaluate_binary_op(op: Operator, left: &Value, right: &Value) -> bool {
    match op {
        Operator::Eq => left == right,
        Operator::Ne => left != right,
        Operator::Lt => compare_values(left, right, |cmp| cmp == Ordering::Less),
        Operator::Le => compare_values(left, right, |cmp| cmp != Ordering::Greater),
        Operator::Gt => compare_values(left, right, |cmp| cmp == Ordering::Greater),
        Operator::Ge => compare_values(left, right, |cmp| cmp != Ordering::Less),
        Operator::Contains => left.contains_text(right),
        Operator::In => left.is_contained_in(right),
        Operator::NotIn => matches!(right, Value::List(_)) && !left.is_contained_in(right),
        Operator::And => left.is_truthy() && right.is_truthy(),
        Operator::Or => left.is_truthy() || right.is_truthy(),
        Operator::Not => !right.is_truthy(),
    }
}

/// Ordering comparison; NULLs and incomparable types are false
fn compare_values<F>(left: &Value, right: &Value, predicate: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    left.compare(right).is_some_and(predicate)
}

/// Evaluate an expression against a row, coercing the result to a boolean
pub fn evaluate_predicate<R: Fields + ?Sized>(expr: &CompiledExpression, row: &R) -> bool {
    ExpressionEvaluator::new(row).evaluate(expr).is_truthy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Record;
    use crate::error::QueryResult;

    fn row() -> Record {
        [
            ("iid", Value::from("data_sample_2")),
            ("email_col1", Value::from("hello_2")),
            ("score", Value::from(20)),
            ("ratio", Value::from(0.5)),
            ("missing_score", Value::Null),
        ]
        .into_iter()
        .collect()
    }

    fn eval(input: &str) -> QueryResult<bool> {
        Ok(CompiledExpression::parse(input)?.matches(&row()))
    }

    #[test]
    fn test_literal_only_expressions() -> QueryResult<()> {
        assert!(eval("1 = 1")?);
        assert!(!eval("1 = 2")?);
        assert!(eval("1 = 1.0")?);
        assert!(eval("'a' != 'b'")?);
        Ok(())
    }

    #[test]
    fn test_comparisons() -> QueryResult<()> {
        assert!(eval("score >= 20")?);
        assert!(eval("score > 10")?);
        assert!(!eval("score < 20")?);
        assert!(eval("score <= 20")?);
        assert!(eval("ratio < 1")?);
        assert!(eval("email_col1 > 'hello_1'")?);
        Ok(())
    }

    #[test]
    fn test_type_mismatch_is_false() -> QueryResult<()> {
        assert!(!eval("email_col1 > 5")?);
        assert!(!eval("email_col1 < 5")?);
        assert!(!eval("missing_score > 0")?);
        assert!(!eval("missing_score <= 0")?);
        assert!(!eval("nope >= 0")?);
        assert!(!eval("score = '20'")?);
        Ok(())
    }

    #[test]
    fn test_null_equality() -> QueryResult<()> {
        assert!(eval("missing_score = nope")?);
        assert!(!eval("missing_score != nope")?);
        Ok(())
    }

    #[test]
    fn test_contains_is_case_insensitive() -> QueryResult<()> {
        assert!(eval("email_col1 CONTAINS 'HELLO'")?);
        assert!(!eval("email_col1 contains 'bye'")?);
        assert!(!eval("score CONTAINS '2'")?);
        Ok(())
    }

    #[test]
    fn test_membership() -> QueryResult<()> {
        assert!(eval("score IN (10, 20, 30)")?);
        assert!(eval("score IN ('20')")?);
        assert!(!eval("score NOT IN (10, 20)")?);
        assert!(eval("iid IN (data_sample_2, data_sample_3)")?);
        assert!(eval("iid NOT IN ('data_sample_9')")?);
        assert!(!eval("score IN ()")?);
        Ok(())
    }

    #[test]
    fn test_precedence_or_and() -> QueryResult<()> {
        // true OR (false AND false) == true, whereas (true OR false) AND false == false
        assert!(eval("score = 20 OR score = 1 AND score = 2")?);
        assert!(!eval("(score = 20 OR score = 1) AND score = 2")?);
        Ok(())
    }

    #[test]
    fn test_not() -> QueryResult<()> {
        assert!(eval("NOT (score = 1)")?);
        assert!(!eval("NOT (score = 20 AND ratio < 1)")?);
        // NOT binds to the column, and a boolean never equals an integer
        assert!(!eval("NOT score = 1")?);
        Ok(())
    }

    #[test]
    fn test_bare_column_truthiness() -> QueryResult<()> {
        assert!(eval("score")?);
        assert!(!eval("missing_score")?);
        Ok(())
    }

    #[test]
    fn test_empty_expression_is_false() {
        let expr = CompiledExpression::default();
        assert_eq!(ExpressionEvaluator::new(&row()).evaluate(&expr), Value::Null);
        assert!(!evaluate_predicate(&expr, &row()));
    }

    #[test]
    fn test_binary_ops_directly() {
        let list = Value::from(vec![1, 2]);
        assert!(evaluate_binary_op(Operator::In, &Value::from(1), &list));
        assert!(!evaluate_binary_op(Operator::NotIn, &Value::from(1), &Value::from(1)));
        assert!(evaluate_binary_op(Operator::Or, &Value::from(0), &Value::from("x")));
        assert!(!evaluate_binary_op(Operator::And, &Value::from(true), &Value::Null));
    }
}
