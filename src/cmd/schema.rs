//! Schema command: JSON Schema for the snapshot format and --json outputs.

use super::ErdSummary;
use crate::schema::Snapshot;
use anyhow::{Context, Result};
use schemars::{schema_for, Schema};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// All published schemas, keyed by name. BTreeMap keeps the output diffable.
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();
    schemas.insert("snapshot", schema_for!(Snapshot));
    schemas.insert("erd", schema_for!(ErdSummary));
    schemas
}

pub fn get_schema(name: &str) -> Option<Schema> {
    all_schemas().remove(name)
}

pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}

pub fn run(name: String, output: Option<PathBuf>) -> Result<()> {
    let schema = get_schema(&name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown schema: {}. Valid options: {}",
            name,
            schema_names().join(", ")
        )
    })?;
    let json = serde_json::to_string_pretty(&schema)?;

    match output {
        Some(path) => {
            fs::write(&path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Schema written to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
