//! Schema introspection sources.
//!
//! Every source implements [`SchemaInspector`] and returns tables in the
//! order the diagram should list them. The schema name is always passed in
//! by the caller.

mod compression;

pub use compression::{strip_compression_ext, Compression};

use crate::schema::{parse_ddl, Snapshot, Table};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Introspection port: produce the tables of one schema
pub trait SchemaInspector {
    fn get_tables(&self, schema_name: Option<&str>) -> Result<Vec<Table>>;
}

/// Database kinds whose dumps we recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
    Sqlite,
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(format!(
                "Unknown dialect: {}. Valid options: postgres, mysql, sqlite",
                s
            )),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgresql"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl Dialect {
    /// Schema used when the caller does not name one
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            Dialect::Postgres => Some("public"),
            Dialect::MySql | Dialect::Sqlite => None,
        }
    }
}

/// Kind of input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// SQL DDL script
    Ddl,
    /// JSON or YAML snapshot document
    Snapshot,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ddl" | "sql" => Ok(InputFormat::Ddl),
            "snapshot" | "json" | "yaml" => Ok(InputFormat::Snapshot),
            _ => Err(format!(
                "Unknown input format: {}. Valid options: ddl, snapshot",
                s
            )),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Ddl => write!(f, "ddl"),
            InputFormat::Snapshot => write!(f, "snapshot"),
        }
    }
}

impl InputFormat {
    /// Detect from the file extension, looking through compression suffixes
    pub fn from_path(path: &Path) -> Self {
        let ext = strip_compression_ext(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("json" | "yaml" | "yml") => InputFormat::Snapshot,
            _ => InputFormat::Ddl,
        }
    }
}

/// Build the inspector for an input file
pub fn inspector_for(path: &Path, format: InputFormat) -> Box<dyn SchemaInspector> {
    match format {
        InputFormat::Ddl => Box::new(DdlInspector::new(path)),
        InputFormat::Snapshot => Box::new(SnapshotInspector::new(path)),
    }
}

/// Reads tables from a SQL DDL script (optionally compressed)
#[derive(Debug, Clone)]
pub struct DdlInspector {
    path: PathBuf,
}

impl DdlInspector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SchemaInspector for DdlInspector {
    fn get_tables(&self, schema_name: Option<&str>) -> Result<Vec<Table>> {
        let sql = read_input(&self.path)?;
        let tables = parse_ddl(&sql, schema_name);
        info!(
            file = %self.path.display(),
            schema = ?schema_name,
            tables = tables.len(),
            "parsed DDL"
        );
        Ok(tables)
    }
}

/// Reads tables from a JSON or YAML snapshot document.
///
/// Snapshots are already scoped to one schema, so the schema name is ignored.
#[derive(Debug, Clone)]
pub struct SnapshotInspector {
    path: PathBuf,
}

impl SnapshotInspector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// A snapshot document, or a bare list of tables
#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Wrapped(Snapshot),
    Bare(Vec<Table>),
}

impl SchemaInspector for SnapshotInspector {
    fn get_tables(&self, _schema_name: Option<&str>) -> Result<Vec<Table>> {
        let text = read_input(&self.path)?;
        let is_yaml = matches!(
            strip_compression_ext(&self.path)
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .as_deref(),
            Some("yaml" | "yml")
        );

        let document: SnapshotDocument = if is_yaml {
            serde_yaml_ng::from_str(&text)
                .with_context(|| format!("invalid snapshot: {}", self.path.display()))?
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("invalid snapshot: {}", self.path.display()))?
        };

        let tables = match document {
            SnapshotDocument::Wrapped(snapshot) => snapshot.tables,
            SnapshotDocument::Bare(tables) => tables,
        };
        info!(file = %self.path.display(), tables = tables.len(), "loaded snapshot");
        Ok(tables)
    }
}

/// Read an input file to a string, decompressing by extension
fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("input file does not exist: {}", path.display());
    }

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = Compression::from_path(path)
        .wrap_reader(Box::new(file))
        .with_context(|| format!("failed to decompress {}", path.display()))?;

    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_input_format_detection() {
        assert_eq!(InputFormat::from_path(Path::new("s.json")), InputFormat::Snapshot);
        assert_eq!(InputFormat::from_path(Path::new("s.yml.gz")), InputFormat::Snapshot);
        assert_eq!(InputFormat::from_path(Path::new("dump.sql")), InputFormat::Ddl);
        assert_eq!(InputFormat::from_path(Path::new("dump")), InputFormat::Ddl);
    }

    #[test]
    fn test_dialect_default_schema() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap().default_schema(), Some("public"));
        assert_eq!(Dialect::MySql.default_schema(), None);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_snapshot_bare_list_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap.yaml");
        fs::write(
            &path,
            "- name: users\n  columns:\n    - name: id\n      type: INT\n      is_primary_key: true\n",
        )
        .unwrap();

        let tables = SnapshotInspector::new(&path).get_tables(None).unwrap();
        assert_eq!(tables[0].name, "users");
        assert!(tables[0].columns[0].is_primary_key);
        assert!(tables[0].columns[0].is_nullable);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = DdlInspector::new("/nonexistent/schema.sql")
            .get_tables(None)
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_malformed_snapshot_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"tables\": 3}").unwrap();

        let err = SnapshotInspector::new(&path).get_tables(None).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
