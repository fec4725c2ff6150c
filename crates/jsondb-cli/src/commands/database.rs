//! Database-level command handlers

use std::path::Path;

use anyhow::{Context, Result};

use jsondb_core::{Database, DEFAULT_TABLE};

use crate::output::Output;

/// Create a new database file
pub fn init(path: &Path, pretty: bool, output: &Output) -> Result<()> {
    let db = Database::create(path)
        .with_context(|| format!("Failed to initialize database at {:?}", path))?
        .with_pretty(pretty);

    output.success(&format!(
        "Created database {} with table '{}'",
        db.path().display(),
        DEFAULT_TABLE
    ));
    Ok(())
}

/// Print the whole document
pub fn dump(db: &Database, output: &Output) -> Result<()> {
    let text = db.to_json_string()?;
    output.print_document(&text);
    Ok(())
}
