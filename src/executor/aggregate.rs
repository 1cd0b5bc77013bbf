//! Grouping and aggregate functions.
//!
//! This module implements:
//! - `group_by` over one or more columns, producing [`Group`] records in
//!   first-occurrence order of each distinct key
//! - The aggregate functions COUNT, SUM, MIN, MAX and AVG over row slices
//!
//! Every group carries `COUNT` and, for each column with at least one
//! numeric member value, the fields `SUM_<col>`, `MIN_<col>`, `MAX_<col>`
//! and `AVG_<col>`. Non-numeric and NULL values are left out of those
//! aggregates rather than counted as zero.

use crate::access::{Fields, Record, Value};
use crate::executor::Pipeline;
use std::collections::{BTreeSet, HashMap};

/// Name of the row-count field of every group
pub const COUNT_FIELD: &str = "COUNT";

/// Supported aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    /// COUNT(*) counts rows, COUNT(col) counts non-NULL values
    Count,
    /// SUM(col) - sum of numeric values
    Sum,
    /// MIN(col) - smallest numeric value
    Min,
    /// MAX(col) - largest numeric value
    Max,
    /// AVG(col) - mean of numeric values, always a float
    Avg,
}

impl AggregateFunction {
    /// Returns the name of the aggregate function
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Avg => "AVG",
        }
    }

    /// Look up a function by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COUNT" => Some(AggregateFunction::Count),
            "SUM" => Some(AggregateFunction::Sum),
            "MIN" => Some(AggregateFunction::Min),
            "MAX" => Some(AggregateFunction::Max),
            "AVG" => Some(AggregateFunction::Avg),
            _ => None,
        }
    }

    /// Compute the aggregate over `rows`. `column` of `None` or `*` means
    /// "whole row" and only makes a difference for COUNT. Numeric functions
    /// over a column without numeric values return NULL.
    pub fn apply(&self, column: Option<&str>, rows: &[Record]) -> Value {
        let column = column.filter(|c| *c != "*");

        if let AggregateFunction::Count = self {
            let count = match column {
                None => rows.len(),
                Some(c) => rows
                    .iter()
                    .filter(|r| r.field(c).is_some_and(|v| !v.is_null()))
                    .count(),
            };
            return Value::Integer(count as i64);
        }

        let Some(column) = column else {
            return Value::Null;
        };
        let values: Vec<&Value> = rows
            .iter()
            .filter_map(|r| r.field(column))
            .filter(|v| v.is_numeric())
            .collect();
        self.apply_numeric(&values)
    }

    /// Numeric aggregates over values already known to be numbers
    fn apply_numeric(&self, values: &[&Value]) -> Value {
        if values.is_empty() {
            return Value::Null;
        }
        match self {
            AggregateFunction::Count => Value::Integer(values.len() as i64),
            AggregateFunction::Sum => sum(values),
            AggregateFunction::Min => extreme(values, std::cmp::Ordering::Less),
            AggregateFunction::Max => extreme(values, std::cmp::Ordering::Greater),
            AggregateFunction::Avg => {
                let total: f64 = values.iter().filter_map(|v| v.as_f64()).sum();
                Value::Float(total / values.len() as f64)
            }
        }
    }
}

/// Integer sum while every input is an integer and it fits, float otherwise
fn sum(values: &[&Value]) -> Value {
    let mut total: Option<i64> = Some(0);
    for value in values {
        total = match (total, value) {
            (Some(acc), Value::Integer(i)) => acc.checked_add(*i),
            _ => None,
        };
        if total.is_none() {
            break;
        }
    }
    match total {
        Some(i) => Value::Integer(i),
        None => Value::Float(values.iter().filter_map(|v| v.as_f64()).sum()),
    }
}

/// First value that no other value beats in direction `wanted`
fn extreme(values: &[&Value], wanted: std::cmp::Ordering) -> Value {
    let mut best = values[0];
    for value in &values[1..] {
        if value.compare(best) == Some(wanted) {
            best = value;
        }
    }
    best.clone()
}

/// Field name used for an aggregate, e.g. `SUM_amount` or `COUNT_*`
pub fn aggregate_field_name(function: AggregateFunction, column: Option<&str>) -> String {
    format!("{}_{}", function.name(), column.unwrap_or("*"))
}

/// One group produced by `group_by`
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Values of the grouping columns, in grouping-column order
    key: Vec<Value>,
    /// Member rows in input order
    rows: Vec<Record>,
    /// Grouping columns, `COUNT` and the automatic numeric aggregates
    fields: Record,
}

impl Group {
    fn new<S: AsRef<str>>(columns: &[S], key: Vec<Value>, rows: Vec<Record>) -> Self {
        let mut fields = Record::new();
        for (column, value) in columns.iter().zip(&key) {
            fields.insert(column.as_ref(), value.clone());
        }
        fields.insert(COUNT_FIELD, Value::Integer(rows.len() as i64));

        let numeric_columns: BTreeSet<&str> = rows
            .iter()
            .flat_map(|r| r.iter())
            .filter(|(_, v)| v.is_numeric())
            .map(|(c, _)| c.as_str())
            .collect();

        for column in numeric_columns {
            let values: Vec<&Value> = rows
                .iter()
                .filter_map(|r| r.get(column))
                .filter(|v| v.is_numeric())
                .collect();
            for function in [
                AggregateFunction::Sum,
                AggregateFunction::Min,
                AggregateFunction::Max,
                AggregateFunction::Avg,
            ] {
                fields.insert(
                    aggregate_field_name(function, Some(column)),
                    function.apply_numeric(&values),
                );
            }
        }

        Self { key, rows, fields }
    }

    pub fn key(&self) -> &[Value] {
        &self.key
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn first_row(&self) -> Option<&Record> {
        self.rows.first()
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// The group as a flat record, without its member rows
    pub fn to_record(&self) -> Record {
        self.fields.clone()
    }
}

impl Fields for Group {
    fn field(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }
}

impl Pipeline<Record> {
    /// Partition rows by the values of `columns`. Groups appear in the order
    /// their key first occurs.
    pub fn group_by<S: AsRef<str>>(&self, columns: &[S]) -> Pipeline<Group> {
        let mut index = HashMap::new();
        let mut partitions: Vec<(Vec<Value>, Vec<Record>)> = Vec::new();

        for row in self.iter() {
            let key: Vec<Value> = columns
                .iter()
                .map(|c| row.field_or_null(c.as_ref()))
                .collect();
            let slot = *index
                .entry(key.iter().map(Value::group_key).collect::<Vec<_>>())
                .or_insert_with(|| {
                    partitions.push((key.clone(), Vec::new()));
                    partitions.len() - 1
                });
            partitions[slot].1.push(row.clone());
        }

        partitions
            .into_iter()
            .map(|(key, rows)| Group::new(columns, key, rows))
            .collect()
    }

    /// Compute one aggregate over every row in the pipeline
    pub fn aggregate(&self, function: AggregateFunction, column: Option<&str>) -> Value {
        function.apply(column, self.all())
    }
}
