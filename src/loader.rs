//! Folder-based table source.
//!
//! Layout on disk:
//!
//! ```text
//! <base>/
//!   <entity-a>/metadata.json   {"emails": {...}, "labels": {...}}
//!   <entity-b>/metadata.json   {"emails": {...}, "size": 42}
//! ```
//!
//! Every top-level key of a metadata file names a table and contributes one
//! row to it. The row's identity column is the folder name. Object values
//! are flattened into columns, any other value lands in the `value` column.
//! Folders are visited in name order, so row order is stable across runs.

use crate::access::{Record, Value};
use crate::catalog::{Table, TableSource, IDENTITY_COLUMN};
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default metadata file name inside each entity folder
pub const DEFAULT_METADATA_FILE: &str = "metadata.json";

/// Column holding non-object table values
pub const VALUE_COLUMN: &str = "value";

/// Convert a JSON value into a flat column value. Arrays and objects have
/// no flat representation and are kept as their JSON text.
pub fn value_from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        nested => Value::String(nested.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct FolderLoader {
    base_path: PathBuf,
    metadata_file: String,
}

impl FolderLoader {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self::with_metadata_file(base_path, DEFAULT_METADATA_FILE)
    }

    pub fn with_metadata_file(
        base_path: impl Into<PathBuf>,
        metadata_file: impl Into<String>,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            metadata_file: metadata_file.into(),
        }
    }

    /// Entity folders holding a metadata file, sorted by name
    fn entity_folders(&self) -> Result<Vec<(String, PathBuf)>> {
        let entries = fs::read_dir(&self.base_path)
            .with_context(|| format!("Failed to read data directory {:?}", self.base_path))?;

        let mut folders = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let metadata_path = path.join(&self.metadata_file);
            if !path.is_dir() || !metadata_path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            folders.push((name, metadata_path));
        }
        folders.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(folders)
    }

    /// Parse one metadata file into `(table, row)` pairs
    fn read_metadata(entity: &str, path: &Path) -> Result<Vec<(String, Record)>> {
        let text = fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&text)?;
        let serde_json::Value::Object(tables) = json else {
            bail!("top-level value is not an object");
        };

        let rows = tables
            .iter()
            .map(|(table, data)| {
                let mut row = Record::new();
                row.insert(IDENTITY_COLUMN, entity);
                match data {
                    serde_json::Value::Object(fields) => {
                        for (column, value) in fields {
                            row.insert(column.as_str(), value_from_json(value));
                        }
                    }
                    other => row.insert(VALUE_COLUMN, value_from_json(other)),
                }
                (table.clone(), row)
            })
            .collect();
        Ok(rows)
    }
}

impl TableSource for FolderLoader {
    fn load_tables(&self) -> Result<Vec<Table>> {
        let mut tables: BTreeMap<String, Vec<Record>> = BTreeMap::new();

        for (entity, path) in self.entity_folders()? {
            let rows = match Self::read_metadata(&entity, &path) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    continue;
                }
            };
            debug!("Loaded {} table rows from {}", rows.len(), path.display());
            for (table, row) in rows {
                tables.entry(table).or_default().push(row);
            }
        }

        info!(
            "Loaded {} tables from {}",
            tables.len(),
            self.base_path.display()
        );
        Ok(tables
            .into_iter()
            .map(|(name, rows)| Table::new(name, rows))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use tempfile::TempDir;

    fn write_entity(dir: &Path, entity: &str, file: &str, contents: &str) -> Result<()> {
        let folder = dir.join(entity);
        fs::create_dir_all(&folder)?;
        fs::write(folder.join(file), contents)?;
        Ok(())
    }

    #[test]
    fn test_load_tables() -> Result<()> {
        let dir = TempDir::new()?;
        write_entity(
            dir.path(),
            "b_002",
            DEFAULT_METADATA_FILE,
            r#"{"emails": {"subject": "bye", "score": 2.5}, "size": 7}"#,
        )?;
        write_entity(
            dir.path(),
            "a_001",
            DEFAULT_METADATA_FILE,
            r#"{"emails": {"subject": "hi", "score": 10, "tags": ["x"]}}"#,
        )?;

        let catalog = Catalog::from_source(&FolderLoader::new(dir.path()))?;

        let emails = catalog.get_table("emails").context("emails table")?;
        assert_eq!(emails.len(), 2);
        let first = &emails.rows()[0];
        assert_eq!(first.get(IDENTITY_COLUMN), Some(&Value::from("a_001")));
        assert_eq!(first.get("score"), Some(&Value::Integer(10)));
        assert_eq!(first.get("tags"), Some(&Value::from(r#"["x"]"#)));
        assert_eq!(emails.rows()[1].get("score"), Some(&Value::Float(2.5)));

        let size = catalog.get_table("size").context("size table")?;
        assert_eq!(size.rows()[0].get(VALUE_COLUMN), Some(&Value::Integer(7)));
        assert_eq!(size.rows()[0].get(IDENTITY_COLUMN), Some(&Value::from("b_002")));
        Ok(())
    }

    #[test]
    fn test_bad_files_are_skipped() -> Result<()> {
        let dir = TempDir::new()?;
        write_entity(dir.path(), "broken", DEFAULT_METADATA_FILE, "{ not json")?;
        write_entity(dir.path(), "list", DEFAULT_METADATA_FILE, "[1, 2]")?;
        write_entity(dir.path(), "other", "other.json", r#"{"t": {}}"#)?;
        write_entity(dir.path(), "ok", DEFAULT_METADATA_FILE, r#"{"t": {"x": null}}"#)?;
        fs::write(dir.path().join("stray.json"), "{}")?;

        let tables = FolderLoader::new(dir.path()).load_tables()?;
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name(), "t");
        assert_eq!(tables[0].rows()[0].get("x"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn test_custom_metadata_file() -> Result<()> {
        let dir = TempDir::new()?;
        write_entity(dir.path(), "e1", "meta.json", r#"{"t": {"n": 1}}"#)?;

        let loader = FolderLoader::with_metadata_file(dir.path(), "meta.json");
        assert_eq!(loader.load_tables()?.len(), 1);
        assert!(FolderLoader::new(dir.path()).load_tables()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let err = FolderLoader::new("/definitely/not/here").load_tables().unwrap_err();
        assert!(err.to_string().contains("Failed to read data directory"));
    }

    #[test]
    fn test_value_from_json() {
        assert_eq!(value_from_json(&serde_json::json!(true)), Value::Boolean(true));
        assert_eq!(value_from_json(&serde_json::json!(u64::MAX)), Value::Float(u64::MAX as f64));
        assert_eq!(value_from_json(&serde_json::json!({"a": 1})), Value::from(r#"{"a":1}"#));
    }
}
