//! Table structure held by the catalog.

use crate::access::Record;
use crate::executor::Pipeline;
use std::collections::BTreeSet;

/// A named, ordered sequence of records. Rows are fixed once the table is
/// registered; queries only ever read them.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    rows: Vec<Record>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Start a relational-algebra pipeline over a copy of the rows
    pub fn query(&self) -> Pipeline<Record> {
        Pipeline::new(self.rows.clone())
    }

    /// Sorted union of the column names of every row
    pub fn column_names(&self) -> Vec<String> {
        self.rows
            .iter()
            .flat_map(|row| row.column_names())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub(super) fn extend(&mut self, rows: impl IntoIterator<Item = Record>) {
        self.rows.extend(rows);
    }
}
