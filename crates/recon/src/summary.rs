use crate::model::{OverstockStatus, ReconSummary, ReconciledRow, StockStatus, UnmatchedSale};

/// Compute summary counts from reconciled rows.
pub fn compute_summary(rows: &[ReconciledRow], unmatched_sales: Vec<UnmatchedSale>) -> ReconSummary {
    let mut summary = ReconSummary {
        products: rows.len(),
        unmatched_sales,
        ..ReconSummary::default()
    };

    for row in rows {
        match row.stock_status {
            StockStatus::LowStock => summary.low_stock += 1,
            StockStatus::InStock => summary.in_stock += 1,
        }
        match row.overstock_status {
            OverstockStatus::PotentialOverstock => summary.potential_overstock += 1,
            OverstockStatus::NormalStock => summary.normal_stock += 1,
        }
        if row.remaining_stock < 0.0 {
            summary.oversold += 1;
        }
        summary.total_in_store += row.quantity_in_store;
        summary.total_sold += row.quantity_sold;
    }

    summary
}
