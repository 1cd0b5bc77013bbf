//! Expression evaluation for WHERE and HAVING clauses.
//!
//! This module provides:
//! - Operator definitions with their binding precedence
//! - Stack-based evaluation of compiled (postfix) expressions against rows
//!
//! Compilation from text lives in [`crate::sql`]; evaluation only needs the
//! postfix token sequence and something implementing [`crate::access::Fields`].

pub mod eval;
pub mod operator;

pub use eval::{evaluate_binary_op, evaluate_predicate, ExpressionEvaluator};
pub use operator::Operator;
