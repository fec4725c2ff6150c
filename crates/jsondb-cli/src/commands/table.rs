//! Table command handlers

use anyhow::{Context, Result};

use jsondb_core::{parse_record, Database};

use crate::output::Output;

/// List all table names
pub fn list(db: &Database, output: &Output) -> Result<()> {
    let names = db.table_names()?;
    output.print_tables(&names);
    Ok(())
}

/// Create a table, optionally with initial fields given as a JSON object
pub fn create(
    db: &mut Database,
    name: String,
    fields: Option<String>,
    output: &Output,
) -> Result<()> {
    let initial = fields
        .as_deref()
        .map(parse_record)
        .transpose()
        .context("Initial fields must be a JSON object")?;

    db.new_table(&name, initial)
        .with_context(|| format!("Failed to create table {}", name))?;

    output.success(&format!("Created table {}", name));
    Ok(())
}

/// Drop a table and all of its records
pub fn drop(db: &mut Database, name: String, output: &Output) -> Result<()> {
    db.drop_table(&name)
        .with_context(|| format!("Failed to drop table {}", name))?;

    output.success(&format!("Dropped table {}", name));
    Ok(())
}

/// Show every entry of a table
pub fn show(db: &Database, name: String, output: &Output) -> Result<()> {
    let table = db.table(&name)?;
    output.print_table(&table);
    Ok(())
}
