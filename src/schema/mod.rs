//! Schema snapshot model.
//!
//! This module provides:
//! - Value types for one introspected snapshot: tables, columns, relations
//! - A serializable `Snapshot` document for JSON/YAML exchange
//! - DDL parsing for building snapshots from SQL scripts

mod ddl;

pub use ddl::*;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Column definition within a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    /// Column name, unique within its table
    pub name: String,
    /// Column type as reported by the source database
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether this column is part of the primary key
    #[serde(default)]
    pub is_primary_key: bool,
    /// Whether this column is constrained by a foreign key
    #[serde(default)]
    pub is_foreign_key: bool,
    /// Whether this column is covered by a unique index or constraint
    #[serde(default)]
    pub is_unique: bool,
    /// Whether this column allows NULL values
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Create a nullable, non-key column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            is_foreign_key: false,
            is_unique: false,
            is_nullable: true,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn foreign_key(mut self) -> Self {
        self.is_foreign_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }
}

/// Foreign-key relation between two tables, by name only.
///
/// The related side may name a table or column that is absent from the
/// snapshot; nothing here checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Relation {
    /// Table holding the foreign key
    pub parent_table_name: String,
    /// Foreign key column
    pub parent_column_name: String,
    /// Referenced table
    pub related_table_name: String,
    /// Referenced column
    pub related_column_name: String,
}

impl Relation {
    pub fn new(
        parent_table_name: impl Into<String>,
        parent_column_name: impl Into<String>,
        related_table_name: impl Into<String>,
        related_column_name: impl Into<String>,
    ) -> Self {
        Self {
            parent_table_name: parent_table_name.into(),
            parent_column_name: parent_column_name.into(),
            related_table_name: related_table_name.into(),
            related_column_name: related_column_name.into(),
        }
    }

    /// `table:column` of the foreign key side
    pub fn tail_endpoint(&self) -> String {
        format!("{}:{}", self.parent_table_name, self.parent_column_name)
    }

    /// `table:column` of the referenced side
    pub fn head_endpoint(&self) -> String {
        format!("{}:{}", self.related_table_name, self.related_column_name)
    }
}

/// Table definition with its columns and outgoing relations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    /// Table name, unique within a snapshot
    pub name: String,
    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Relations whose parent table is this table
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a relation from `column` of this table to `related_table.related_column`
    pub fn with_relation(
        mut self,
        column: impl Into<String>,
        related_table: impl Into<String>,
        related_column: impl Into<String>,
    ) -> Self {
        let relation = Relation::new(self.name.clone(), column, related_table, related_column);
        self.relations.push(relation);
        self
    }

    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub(crate) fn get_column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Serialized snapshot document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Snapshot {
    /// Tables in introspection order
    pub tables: Vec<Table>,
}

impl Snapshot {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    pub fn relation_count(&self) -> usize {
        self.tables.iter().map(|t| t.relations.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_endpoints() {
        let rel = Relation::new("orders", "user_id", "users", "id");
        assert_eq!(rel.tail_endpoint(), "orders:user_id");
        assert_eq!(rel.head_endpoint(), "users:id");
    }

    #[test]
    fn test_column_defaults_nullable_when_absent() {
        let col: Column = serde_json::from_str(r#"{"name": "id", "type": "INT"}"#).unwrap();
        assert!(col.is_nullable);
        assert!(!col.is_primary_key);
        assert!(!col.is_foreign_key);
        assert!(!col.is_unique);
    }

    #[test]
    fn test_table_builder_sets_parent_name() {
        let table = Table::new("orders")
            .with_column(Column::new("user_id", "INT").foreign_key())
            .with_relation("user_id", "users", "id");

        assert_eq!(table.relations[0].parent_table_name, "orders");
        assert!(table.get_column("USER_ID").is_some());
    }
}
