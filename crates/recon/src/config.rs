use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::rank::SaleWindow;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation settings. Every section is optional; an empty file yields
/// the defaults for the standard `Product_Name` / `Quantity_in_Store` /
/// `Quantity` export.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default)]
    pub inventory: InventoryColumns,
    #[serde(default)]
    pub sales: SalesColumns,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub windows: Vec<NamedWindow>,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryColumns {
    #[serde(default = "default_product_column")]
    pub product_column: String,
    #[serde(default = "default_in_store_column")]
    pub quantity_column: String,
}

impl Default for InventoryColumns {
    fn default() -> Self {
        Self {
            product_column: default_product_column(),
            quantity_column: default_in_store_column(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SalesColumns {
    #[serde(default = "default_product_column")]
    pub product_column: String,
    #[serde(default = "default_sold_column")]
    pub quantity_column: String,
    /// Read when present in the header; a missing date column is not an error.
    #[serde(default = "default_date_column")]
    pub date_column: Option<String>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for SalesColumns {
    fn default() -> Self {
        Self {
            product_column: default_product_column(),
            quantity_column: default_sold_column(),
            date_column: default_date_column(),
            date_format: default_date_format(),
        }
    }
}

fn default_product_column() -> String {
    "Product_Name".into()
}

fn default_in_store_column() -> String {
    "Quantity_in_Store".into()
}

fn default_sold_column() -> String {
    "Quantity".into()
}

fn default_date_column() -> Option<String> {
    Some("Date".into())
}

fn default_date_format() -> String {
    "%d/%m/%Y".into()
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Stock classification ratios, relative to `quantity_in_store`.
///
/// Low stock is `remaining < low_stock_ratio * in_store` and potential
/// overstock is `remaining > overstock_ratio * in_store`. Both comparisons
/// are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    #[serde(default = "default_low_stock_ratio")]
    pub low_stock_ratio: f64,
    #[serde(default = "default_overstock_ratio")]
    pub overstock_ratio: f64,
}

pub const DEFAULT_LOW_STOCK_RATIO: f64 = 0.1;
pub const DEFAULT_OVERSTOCK_RATIO: f64 = 0.2;

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_stock_ratio: DEFAULT_LOW_STOCK_RATIO,
            overstock_ratio: DEFAULT_OVERSTOCK_RATIO,
        }
    }
}

fn default_low_stock_ratio() -> f64 {
    DEFAULT_LOW_STOCK_RATIO
}

fn default_overstock_ratio() -> f64 {
    DEFAULT_OVERSTOCK_RATIO
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    #[serde(default)]
    pub negative: NegativePolicy,
}

/// What to do when two inventory rows normalize to the same product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    Error,
    First,
    Last,
}

/// Whether negative quantities in either table are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativePolicy {
    #[default]
    Reject,
    Allow,
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// A named recurring sales window, e.g. a festival period.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedWindow {
    pub name: String,
    /// `MM-DD..MM-DD`, inclusive.
    pub range: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (section, name, value) in [
            ("inventory", "product_column", &self.inventory.product_column),
            ("inventory", "quantity_column", &self.inventory.quantity_column),
            ("sales", "product_column", &self.sales.product_column),
            ("sales", "quantity_column", &self.sales.quantity_column),
        ] {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "[{section}] {name} must not be empty"
                )));
            }
        }

        if let Some(ref date_column) = self.sales.date_column {
            if date_column.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "[sales] date_column must not be empty".into(),
                ));
            }
        }

        for (name, ratio) in [
            ("low_stock_ratio", self.thresholds.low_stock_ratio),
            ("overstock_ratio", self.thresholds.overstock_ratio),
        ] {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(ReconError::ConfigValidation(format!(
                    "[thresholds] {name} must be a non-negative number, got {ratio}"
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for window in &self.windows {
            if !seen.insert(window.name.to_lowercase()) {
                return Err(ReconError::ConfigValidation(format!(
                    "window '{}' is declared more than once",
                    window.name
                )));
            }
            window.range.parse::<SaleWindow>().map_err(|e| {
                ReconError::ConfigValidation(format!("window '{}': {e}", window.name))
            })?;
        }

        Ok(())
    }

    /// Look up a declared window by name (case-insensitive).
    pub fn window(&self, name: &str) -> Option<SaleWindow> {
        self.windows
            .iter()
            .find(|w| w.name.eq_ignore_ascii_case(name))
            .and_then(|w| w.range.parse().ok())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
