//! Sort operator implementation.
//!
//! Orders rows by a single column with a stable sort, ascending or
//! descending. Rows with equal keys keep their input order in both
//! directions.
//!
//! Fallback policy: when the column holds values that cannot be ordered
//! against each other (numbers mixed with text, NULLs mixed with values,
//! lists, NaN) the pipeline is returned in its original order. The failure
//! is logged, never raised.

use crate::access::{DataType, Fields, Value};
use crate::executor::Pipeline;
use log::warn;
use std::cmp::Ordering;

/// Sort order for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Values in the same class can be ordered against each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortClass {
    Null,
    Boolean,
    Numeric,
    Text,
}

fn sort_class(value: &Value) -> Option<SortClass> {
    match value.data_type() {
        None => Some(SortClass::Null),
        Some(DataType::Boolean) => Some(SortClass::Boolean),
        Some(DataType::Integer) => Some(SortClass::Numeric),
        Some(DataType::Float) => match value {
            Value::Float(f) if f.is_nan() => None,
            _ => Some(SortClass::Numeric),
        },
        Some(DataType::Varchar) => Some(SortClass::Text),
        Some(DataType::List) => None,
    }
}

/// Whether every key can be compared with every other key
fn all_orderable(keys: &[Value]) -> bool {
    let mut classes = keys.iter().map(sort_class);
    match classes.next() {
        None => true,
        Some(None) => false,
        Some(Some(first)) => classes.all(|class| class == Some(first)),
    }
}

impl<R: Fields + Clone> Pipeline<R> {
    /// Stable sort by `column`, or the unchanged pipeline if the column's
    /// values are not mutually orderable.
    pub fn order_by(&self, column: &str, descending: bool) -> Self {
        let order = SortOrder::from_descending(descending);
        let keys: Vec<Value> = self.iter().map(|row| row.field_or_null(column)).collect();

        if !all_orderable(&keys) {
            warn!(
                "ORDER BY {}: column holds values that cannot be ordered, keeping input order",
                column
            );
            return self.clone();
        }

        let mut indices: Vec<usize> = (0..keys.len()).collect();
        indices.sort_by(|&a, &b| {
            let cmp = keys[a].compare(&keys[b]).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Asc => cmp,
                SortOrder::Desc => cmp.reverse(),
            }
        });

        indices.into_iter().map(|i| self.all()[i].clone()).collect()
    }
}
