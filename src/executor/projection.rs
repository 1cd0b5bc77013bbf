//! Projection operator implementation.
//!
//! Builds new records holding only the requested columns. A column the
//! source row lacks comes out as NULL rather than an error.

use crate::access::{Fields, Record};
use crate::executor::Pipeline;

impl<R: Fields> Pipeline<R> {
    /// Project the named columns of every row
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Pipeline<Record> {
        self.iter()
            .map(|row| -> Record {
                columns
                    .iter()
                    .map(|c| (c.as_ref(), row.field_or_null(c.as_ref())))
                    .collect()
            })
            .collect()
    }
}
