//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use jsondb_core::Table;
use serde_json::Value;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print table names
    pub fn print_tables(&self, names: &[String]) {
        match self.format {
            OutputFormat::Human => {
                if names.is_empty() {
                    println!("No tables found.");
                    return;
                }
                for name in names {
                    println!("{}", name);
                }
                println!("\n{} table(s)", names.len());
            }
            OutputFormat::Json => {
                println!("{}", Value::from(names.to_vec()));
            }
            OutputFormat::Quiet => {
                for name in names {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print every entry of a table
    pub fn print_table(&self, table: &Table<'_>) {
        match self.format {
            OutputFormat::Human => {
                println!("── {} ──", table.name());
                if table.is_empty() {
                    println!("No records.");
                    return;
                }
                for key in table.keys() {
                    if let Ok(value) = table.get(key) {
                        println!("{} | {}", key, truncate(&value.to_string(), 70));
                    }
                }
                println!("\n{} record(s)", table.len());
            }
            OutputFormat::Json => {
                println!("{:#}", Value::Object(table.content().clone()));
            }
            OutputFormat::Quiet => {
                for key in table.keys() {
                    println!("{}", key);
                }
            }
        }
    }

    /// Print a single stored value
    pub fn print_value(&self, key: &str, value: &Value) {
        match self.format {
            OutputFormat::Human => match value.as_object() {
                Some(record) => {
                    println!("ID: {}", key);
                    for (field, value) in record {
                        println!("  {}: {}", field, value);
                    }
                }
                None => println!("{}: {}", key, value),
            },
            OutputFormat::Json => {
                println!("{:#}", value);
            }
            OutputFormat::Quiet => {
                println!("{}", value);
            }
        }
    }

    /// Print the id allocated to an appended record
    pub fn print_record_id(&self, table: &str, id: u64) {
        match self.format {
            OutputFormat::Human => println!("✓ Added record {} to {}", id, table),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"table": table, "id": id}));
            }
            OutputFormat::Quiet => println!("{}", id),
        }
    }

    /// Print the whole document
    pub fn print_document(&self, text: &str) {
        match self.format {
            OutputFormat::Human | OutputFormat::Quiet => println!("{}", text),
            OutputFormat::Json => match serde_json::from_str::<Value>(text) {
                Ok(value) => println!("{:#}", value),
                Err(_) => println!("{}", text),
            },
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
