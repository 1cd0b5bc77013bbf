//! Table registry.
//!
//! The catalog is an explicit name → [`Table`] map handed to whoever runs
//! queries. Tables come from a [`TableSource`], the contract every loader
//! implements: produce named, ordered sequences of flat records, each
//! carrying the identity column [`IDENTITY_COLUMN`].

pub mod table_info;

pub use table_info::Table;

use crate::access::Record;
use crate::error::{QueryError, QueryResult};
use anyhow::{bail, Result};
use log::debug;
use std::collections::BTreeMap;

/// Column that identifies the entity a loaded record belongs to
pub const IDENTITY_COLUMN: &str = "iid";

/// Anything that can produce tables for a catalog
pub trait TableSource {
    fn load_tables(&self) -> Result<Vec<Table>>;
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: BTreeMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from every table a source produces
    pub fn from_source(source: &dyn TableSource) -> Result<Self> {
        let mut catalog = Self::new();
        for table in source.load_tables()? {
            catalog.register_table(table)?;
        }
        Ok(catalog)
    }

    /// Register a new table
    pub fn register_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(table.name()) {
            bail!("Table '{}' already exists", table.name());
        }
        debug!("Registering table '{}' ({} rows)", table.name(), table.len());
        self.tables.insert(table.name().to_string(), table);
        Ok(())
    }

    /// Append rows to a table, creating it if needed
    pub fn extend_table(&mut self, name: &str, rows: impl IntoIterator<Item = Record>) {
        self.tables
            .entry(name.to_string())
            .or_insert_with(|| Table::new(name, Vec::new()))
            .extend(rows);
    }

    /// Get table by name
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Get table by name, failing the query if it is not registered
    pub fn resolve(&self, name: &str) -> QueryResult<&Table> {
        self.get_table(name)
            .ok_or_else(|| QueryError::UnknownTable(name.to_string()))
    }

    /// Registered tables in name order
    pub fn list_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Value;

    fn row(iid: &str) -> Record {
        [(IDENTITY_COLUMN, Value::from(iid))].into_iter().collect()
    }

    struct FixedSource;

    impl TableSource for FixedSource {
        fn load_tables(&self) -> Result<Vec<Table>> {
            Ok(vec![
                Table::new("b", vec![row("x")]),
                Table::new("a", vec![row("x"), row("y")]),
            ])
        }
    }

    #[test]
    fn test_register_and_resolve() -> Result<()> {
        let mut catalog = Catalog::new();
        catalog.register_table(Table::new("emails", vec![row("1")]))?;

        assert_eq!(catalog.resolve("emails")?.len(), 1);
        assert_eq!(
            catalog.resolve("nope"),
            Err(QueryError::UnknownTable("nope".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_duplicate_table_is_rejected() -> Result<()> {
        let mut catalog = Catalog::new();
        catalog.register_table(Table::new("t", Vec::new()))?;
        let err = catalog.register_table(Table::new("t", Vec::new())).unwrap_err();
        assert_eq!(err.to_string(), "Table 't' already exists");
        Ok(())
    }

    #[test]
    fn test_from_source_lists_in_name_order() -> Result<()> {
        let catalog = Catalog::from_source(&FixedSource)?;
        let names: Vec<&str> = catalog.list_tables().map(Table::name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(catalog.table_count(), 2);
        Ok(())
    }

    #[test]
    fn test_extend_table() {
        let mut catalog = Catalog::new();
        catalog.extend_table("t", vec![row("1")]);
        catalog.extend_table("t", vec![row("2")]);
        assert_eq!(catalog.get_table("t").map(Table::len), Some(2));
    }
}
