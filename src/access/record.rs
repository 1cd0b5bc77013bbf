use crate::access::Value;
use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};

/// Anything a predicate or projection can read columns from.
///
/// Implemented by plain records and by group records, so the same
/// filtering, ordering and projection code runs before and after
/// aggregation.
pub trait Fields {
    /// Look up a column by name. A missing column is `None`, which callers
    /// treat as NULL.
    fn field(&self, column: &str) -> Option<&Value>;

    /// Column value with a missing column read as NULL
    fn field_or_null(&self, column: &str) -> Value {
        self.field(column).cloned().unwrap_or(Value::Null)
    }
}

/// A flat row: column name to value. Column order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    columns: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Set a column, replacing any previous value
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Copy every column of `other` into this record; `other` wins on conflicts
    pub fn merge(&mut self, other: &Record) {
        for (column, value) in other.iter() {
            self.columns.insert(column.clone(), value.clone());
        }
    }
}

impl Fields for Record {
    fn field(&self, column: &str) -> Option<&Value> {
        self.get(column)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
