//! Postfix compiler for boolean expressions.
//!
//! Converts the flat token stream of a WHERE or HAVING clause into postfix
//! order with the shunting-yard algorithm. No tree is built: the output is a
//! flat token sequence that the evaluator runs with an operand stack.
//!
//! Precedence, highest first: `NOT`, then comparisons together with
//! `CONTAINS`/`IN`/`NOT IN`, then `AND`, then `OR`.

use super::lexer::tokenize;
use super::token::Token;
use crate::access::{Fields, Value};
use crate::error::{QueryError, QueryResult};
use crate::expression::{evaluate_predicate, Operator};
use std::fmt;

/// A boolean expression in postfix order, ready to be evaluated against
/// any number of rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledExpression {
    tokens: Vec<Token>,
}

impl CompiledExpression {
    /// Tokenize and compile an expression string
    pub fn parse(input: &str) -> QueryResult<Self> {
        Parser::new(tokenize(input)?).compile()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Evaluate against one row and coerce the result to a boolean
    pub fn matches<R: Fields + ?Sized>(&self, row: &R) -> bool {
        evaluate_predicate(self, row)
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

/// Entry on the operator stack
#[derive(Debug, Clone, Copy, PartialEq)]
enum StackEntry {
    Paren,
    Op(Operator),
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    output: Vec<Token>,
    stack: Vec<StackEntry>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            output: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Run the shunting-yard pass and validate the result
    pub fn compile(mut self) -> QueryResult<CompiledExpression> {
        while self.position < self.tokens.len() {
            let token = self.tokens[self.position].clone();
            self.position += 1;

            match token {
                Token::Literal(_) | Token::Identifier(_) => self.output.push(token),
                Token::Operator(Operator::Not) if self.next_is(Operator::In) => {
                    self.position += 1;
                    self.membership(Operator::NotIn)?;
                }
                // Prefix operator: nothing binds tighter, so nothing is popped
                Token::Operator(Operator::Not) => self.stack.push(StackEntry::Op(Operator::Not)),
                Token::Operator(Operator::In) => self.membership(Operator::In)?,
                Token::Operator(op) => self.push_operator(op),
                Token::LeftParen => self.stack.push(StackEntry::Paren),
                Token::RightParen => self.close_paren()?,
                Token::Comma => {
                    return Err(QueryError::syntax(
                        "Unexpected ',' outside of an IN list",
                    ))
                }
            }
        }

        while let Some(entry) = self.stack.pop() {
            match entry {
                StackEntry::Op(op) => self.output.push(Token::Operator(op)),
                StackEntry::Paren => return Err(QueryError::syntax("Mismatched parentheses")),
            }
        }

        check_arity(&self.output)?;
        Ok(CompiledExpression {
            tokens: self.output,
        })
    }

    fn next_is(&self, op: Operator) -> bool {
        self.tokens.get(self.position) == Some(&Token::Operator(op))
    }

    /// Pop operators that bind at least as tightly as `op`, then push `op`
    fn push_operator(&mut self, op: Operator) {
        while let Some(StackEntry::Op(top)) = self.stack.last() {
            if top.precedence() >= op.precedence() {
                self.output.push(Token::Operator(*top));
                self.stack.pop();
            } else {
                break;
            }
        }
        self.stack.push(StackEntry::Op(op));
    }

    fn close_paren(&mut self) -> QueryResult<()> {
        loop {
            match self.stack.pop() {
                Some(StackEntry::Op(op)) => self.output.push(Token::Operator(op)),
                Some(StackEntry::Paren) => return Ok(()),
                None => return Err(QueryError::syntax("Mismatched parentheses")),
            }
        }
    }

    /// Consume the parenthesized list following `IN`/`NOT IN`, emit it as a
    /// single list literal and push the operator.
    fn membership(&mut self, op: Operator) -> QueryResult<()> {
        if self.tokens.get(self.position) != Some(&Token::LeftParen) {
            return Err(QueryError::syntax(format!(
                "{} must be followed by a parenthesized list",
                op
            )));
        }
        self.position += 1;

        let mut items = Vec::new();
        let mut expect_item = true;
        loop {
            let Some(token) = self.tokens.get(self.position) else {
                return Err(QueryError::syntax(format!("Unterminated {} list", op)));
            };
            self.position += 1;

            match token {
                Token::RightParen => break,
                Token::Comma if !expect_item => expect_item = true,
                Token::Literal(value) if expect_item => {
                    items.push(coerce_list_item(value));
                    expect_item = false;
                }
                Token::Identifier(word) if expect_item => {
                    items.push(coerce_list_item(&Value::String(word.clone())));
                    expect_item = false;
                }
                other => {
                    return Err(QueryError::syntax(format!(
                        "Malformed {} list near '{}'",
                        op, other
                    )))
                }
            }
        }
        if expect_item && !items.is_empty() {
            return Err(QueryError::syntax(format!("Malformed {} list: trailing ','", op)));
        }

        self.output.push(Token::Literal(Value::List(items)));
        self.push_operator(op);
        Ok(())
    }
}

/// List elements that look numeric become numbers, everything else stays text
fn coerce_list_item(value: &Value) -> Value {
    let Value::String(text) = value else {
        return value.clone();
    };
    if let Ok(i) = text.parse::<i64>() {
        return Value::Integer(i);
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::Float(f),
        _ => value.clone(),
    }
}

/// Simulate the operand stack so a malformed expression fails before any row is read
fn check_arity(postfix: &[Token]) -> QueryResult<()> {
    let mut depth = 0usize;
    for token in postfix {
        match token {
            Token::Operator(op) => {
                if depth < op.arity() {
                    return Err(QueryError::syntax(format!(
                        "Operator {} is missing an operand",
                        op
                    )));
                }
                depth = depth + 1 - op.arity();
            }
            _ => depth += 1,
        }
    }
    if depth > 1 {
        return Err(QueryError::syntax(
            "Expression has operands without an operator between them",
        ));
    }
    Ok(())
}
