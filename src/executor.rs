//! Executor layer for query execution.
//!
//! This module implements the relational-algebra pipeline. A [`Pipeline`] is
//! an ordered, fully materialized sequence of rows; every operator borrows
//! the pipeline it is called on and returns a new one, so inputs are never
//! mutated and operators chain freely:
//!
//! ```ignore
//! let top = table
//!     .query()
//!     .filter(&[Condition::new("score", ">", 10)])
//!     .order_by("score", true)
//!     .limit(3);
//! ```
//!
//! Rows are plain [`Record`]s until `group_by`, which produces [`Group`]
//! records. Filtering, ordering, limiting and projection work on both.

use crate::access::{Fields, Record};
use std::fmt;

pub mod aggregate;
pub mod filter;
pub mod limit;
pub mod nested_loop_join;
pub mod projection;
pub mod sort;

// Re-export operator building blocks
pub use aggregate::{aggregate_field_name, AggregateFunction, Group, COUNT_FIELD};
pub use filter::{Condition, ConditionOp};

/// An immutable, ordered sequence of rows flowing between operators
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline<R = Record> {
    rows: Vec<R>,
}

impl<R> Pipeline<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    /// All rows currently in the pipeline
    pub fn all(&self) -> &[R] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl<R> From<Vec<R>> for Pipeline<R> {
    fn from(rows: Vec<R>) -> Self {
        Self::new(rows)
    }
}

impl<R> FromIterator<R> for Pipeline<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, R> IntoIterator for &'a Pipeline<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Renders rows as a text table: sorted column header, a rule, one line per
/// row. Missing columns render as blanks.
impl fmt::Display for Pipeline<Record> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return writeln!(f, "(empty)");
        }

        let mut columns: Vec<&str> = self.rows.iter().flat_map(|r| r.column_names()).collect();
        columns.sort_unstable();
        columns.dedup();

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.field(c).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(f, "{}", header)?;
        writeln!(f, "{}", "-".repeat(header.chars().count()))?;

        for row in &cells {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
