//! Nested loop join implementation.
//!
//! Inner equi-join on a single key column. For each left row, every right
//! row whose key equals the left key produces one merged row; when both
//! sides carry a column the right row's value wins. Key equality is plain
//! value equality with no coercion between text and numbers. Rows lacking
//! the key read it as NULL, and NULL keys match each other.

use crate::access::{Fields, Record, Value};
use crate::executor::Pipeline;

impl Pipeline<Record> {
    /// Inner join with `other` on `key`
    pub fn join(&self, other: &Pipeline<Record>, key: &str) -> Pipeline<Record> {
        let mut joined = Vec::new();

        for left in self.iter() {
            let left_key = left.field(key).unwrap_or(&Value::Null);
            for right in other.iter() {
                if right.field(key).unwrap_or(&Value::Null) == left_key {
                    let mut merged = left.clone();
                    merged.merge(right);
                    joined.push(merged);
                }
            }
        }

        Pipeline::new(joined)
    }

    /// Join each table in turn onto the running result, all on the same key
    pub fn multi_join(&self, tables: &[Pipeline<Record>], key: &str) -> Pipeline<Record> {
        tables
            .iter()
            .fold(self.clone(), |joined, table| joined.join(table, key))
    }
}
