use crate::catalog::{Catalog, Table, TableSource};
use crate::error::QueryResult;
use crate::executor::Pipeline;
use crate::loader::FolderLoader;
use crate::session::Session;
use anyhow::{Context, Result};
use std::path::Path;

/// High-level interface over a set of loaded tables. Exposes both the
/// relational-algebra pipeline (`table`) and the SQL subset (`sql`).
#[derive(Debug, Clone, Default)]
pub struct Database {
    catalog: Catalog,
}

impl Database {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Load every table found under a data directory
    pub fn open(path: &Path, metadata_file: &str) -> Result<Self> {
        let loader = FolderLoader::with_metadata_file(path, metadata_file);
        Self::from_source(&loader)
            .with_context(|| format!("Failed to open database at {}", path.display()))
    }

    pub fn from_source(source: &dyn TableSource) -> Result<Self> {
        Ok(Self::new(Catalog::from_source(source)?))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Start a pipeline over a table
    pub fn table(&self, name: &str) -> Option<Pipeline> {
        self.catalog.get_table(name).map(Table::query)
    }

    /// Run a SQL query
    pub fn sql(&self, query: &str) -> QueryResult<Pipeline> {
        Session::new(&self.catalog).execute(query).map(Pipeline::new)
    }

    pub fn list_tables(&self) -> Vec<&str> {
        self.catalog.list_tables().map(Table::name).collect()
    }
}
