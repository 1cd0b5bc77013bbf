//! Limit operator implementation.
//!
//! Keeps the first `n` rows in their current order. Asking for more rows
//! than the pipeline holds returns everything.

use crate::executor::Pipeline;

impl<R: Clone> Pipeline<R> {
    /// Truncate to at most `n` rows
    pub fn limit(&self, n: usize) -> Self {
        self.iter().take(n).cloned().collect()
    }
}
