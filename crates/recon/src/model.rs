use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::Thresholds;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of the "before" table: stock on hand at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRecord {
    pub product_name: String,
    pub quantity_in_store: f64,
}

/// One sales transaction from the "after" table.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub product_name: String,
    pub quantity: f64,
    /// Only populated when the sales table has a date column.
    pub date: Option<NaiveDate>,
}

impl InventoryRecord {
    pub fn new(product_name: impl Into<String>, quantity_in_store: f64) -> Self {
        Self {
            product_name: product_name.into(),
            quantity_in_store,
        }
    }
}

impl SalesRecord {
    pub fn new(product_name: impl Into<String>, quantity: f64) -> Self {
        Self {
            product_name: product_name.into(),
            quantity,
            date: None,
        }
    }
}

/// Both tables, loaded and schema-checked.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub inventory: Vec<InventoryRecord>,
    pub sales: Vec<SalesRecord>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    LowStock,
    InStock,
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowStock => write!(f, "Low Stock"),
            Self::InStock => write!(f, "In Stock"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverstockStatus {
    PotentialOverstock,
    NormalStock,
}

impl fmt::Display for OverstockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PotentialOverstock => write!(f, "Potential Over-stock"),
            Self::NormalStock => write!(f, "Normal Stock"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One reconciled product. Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRow {
    pub product_name: String,
    pub quantity_in_store: f64,
    pub quantity_sold: f64,
    pub remaining_stock: f64,
    pub stock_status: StockStatus,
    pub overstock_status: OverstockStatus,
}

/// Sales for a product that has no inventory row. Dropped from the join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedSale {
    pub product_name: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub products: usize,
    pub low_stock: usize,
    pub in_stock: usize,
    pub potential_overstock: usize,
    pub normal_stock: usize,
    pub oversold: usize,
    pub total_in_store: f64,
    pub total_sold: f64,
    pub unmatched_sales: Vec<UnmatchedSale>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub rows: Vec<ReconciledRow>,
}
