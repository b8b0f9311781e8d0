use crate::config::Thresholds;
use crate::model::{OverstockStatus, StockStatus};

/// `LowStock` iff `remaining < low_stock_ratio * in_store`.
pub fn stock_status(remaining: f64, in_store: f64, thresholds: &Thresholds) -> StockStatus {
    if remaining < thresholds.low_stock_ratio * in_store {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// `PotentialOverstock` iff `remaining > overstock_ratio * in_store`.
pub fn overstock_status(remaining: f64, in_store: f64, thresholds: &Thresholds) -> OverstockStatus {
    if remaining > thresholds.overstock_ratio * in_store {
        OverstockStatus::PotentialOverstock
    } else {
        OverstockStatus::NormalStock
    }
}

/// Both classifications for one product.
pub fn classify(
    remaining: f64,
    in_store: f64,
    thresholds: &Thresholds,
) -> (StockStatus, OverstockStatus) {
    (
        stock_status(remaining, in_store, thresholds),
        overstock_status(remaining, in_store, thresholds),
    )
}
