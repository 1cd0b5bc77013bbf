//! Access layer for record-oriented data.
//!
//! This module provides the in-memory data model every other layer works on:
//!
//! - **Value**: Tagged representation of a single column value
//! - **DataType**: The type tag of a non-NULL value
//! - **Record**: One flat row, a mapping from column name to value
//!
//! Records are produced once by a table source and never mutated by the
//! query engine; operators clone what they need into new records.

pub mod record;
pub mod value;

pub use record::{Fields, Record};
pub use value::{DataType, Value};
