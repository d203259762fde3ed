//! Inspect command: write the normalized snapshot as JSON.

use crate::inspect::{inspector_for, InputFormat};
use crate::schema::Snapshot;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn run(
    file: PathBuf,
    schema: Option<String>,
    input_format: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let input_format = match input_format {
        Some(f) => f.parse().map_err(|e| anyhow::anyhow!("{}", e))?,
        None => InputFormat::from_path(&file),
    };

    let tables = inspector_for(&file, input_format).get_tables(schema.as_deref())?;
    let snapshot = Snapshot::new(tables);
    let json = serde_json::to_string_pretty(&snapshot)?;

    match output {
        Some(path) => {
            fs::write(&path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Snapshot written to: {} ({} tables, {} columns, {} relations)",
                path.display(),
                snapshot.tables.len(),
                snapshot.column_count(),
                snapshot.relation_count()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
