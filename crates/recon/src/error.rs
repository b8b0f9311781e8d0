use std::fmt;

use thiserror::Error;

/// Which input table a record or column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Inventory,
    Sales,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inventory => write!(f, "inventory"),
            Self::Sales => write!(f, "sales"),
        }
    }
}

/// A normalized product key that appears more than once in the inventory table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad ratio, empty column name, bad window, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Missing required column in an input table.
    #[error("{table} table: missing column '{column}'")]
    Schema { table: Table, column: String },
    /// A quantity is not a finite number, or is negative while negatives are
    /// rejected. `row` is the 1-based data row (header excluded).
    #[error("{table} table, row {row}: cannot use '{value}' as {column}")]
    TypeConversion {
        table: Table,
        column: String,
        row: usize,
        value: String,
    },
    /// Normalized product names repeated in the inventory table.
    #[error("{}", format_duplicates(.0))]
    DuplicateKey(Vec<DuplicateKey>),
    /// Malformed CSV (ragged rows, bad quoting, invalid UTF-8).
    #[error("{table} table: {message}")]
    Csv { table: Table, message: String },
}

fn format_duplicates(dups: &[DuplicateKey]) -> String {
    let mut out = String::from("duplicate products in inventory table:");
    for dup in dups {
        out.push_str(&format!("\n  {:?} appears {} times", dup.key, dup.count));
    }
    out
}
