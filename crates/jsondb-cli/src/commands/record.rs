//! Record command handlers

use anyhow::{Context, Result};
use serde_json::Value;

use jsondb_core::{parse_record, Database};

use crate::output::Output;

/// Append a record given as a JSON object
pub fn add(db: &mut Database, table: String, json: String, output: &Output) -> Result<()> {
    let record = parse_record(&json).context("Record must be a JSON object")?;

    let id = db
        .append(&table, record)
        .with_context(|| format!("Failed to add record to {}", table))?;

    output.print_record_id(&table, id);
    Ok(())
}

/// Show the value stored under a key
pub fn get(db: &Database, table: String, key: String, output: &Output) -> Result<()> {
    let value = db.table(&table)?.get(&key)?;
    output.print_value(&key, value);
    Ok(())
}

/// Add a new field to an existing record
///
/// `value` is parsed as JSON; anything that is not valid JSON is stored as a
/// plain string.
pub fn set(
    db: &mut Database,
    table: String,
    id: u64,
    field: String,
    value: String,
    output: &Output,
) -> Result<()> {
    let value = parse_value(&value);

    db.append_value_to_table(&table, id, &field, value)
        .with_context(|| format!("Failed to set {} on record {} in {}", field, id, table))?;

    output.success(&format!("Set {} on record {} in {}", field, id, table));
    Ok(())
}

/// Delete the entry stored under a key
pub fn delete(db: &mut Database, table: String, key: String, output: &Output) -> Result<()> {
    db.delete(&table, &key)
        .with_context(|| format!("Failed to delete {} from {}", key, table))?;

    output.success(&format!("Deleted {} from {}", key, table));
    Ok(())
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
