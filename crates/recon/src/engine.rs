use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::aggregate::{aggregate_sales, SalesAggregate};
use crate::classify::classify;
use crate::config::{DuplicatePolicy, NegativePolicy, ReconConfig, Thresholds};
use crate::error::{DuplicateKey, ReconError, Table};
use crate::model::{
    InventoryRecord, ReconInput, ReconMeta, ReconResult, ReconciledRow, SalesRecord, UnmatchedSale,
};
use crate::normalize::normalize;
use crate::summary::compute_summary;

/// Run reconciliation per config. Returns reconciled rows + summary.
///
/// Quantities are checked first, then inventory keys, and only then are the
/// tables joined. Any error aborts the run with no partial output.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    check_quantities(input, config)?;
    let inventory = resolve_duplicates(&input.inventory, config.policy.duplicates)?;

    let sales = aggregate_sales(&input.sales);
    debug!(
        inventory_rows = inventory.len(),
        sales_rows = input.sales.len(),
        sold_products = sales.len(),
        "aggregated sales"
    );

    let rows = reconcile(&inventory, &sales, &config.thresholds);
    let unmatched = unmatched_sales(&inventory, &sales);
    for sale in &unmatched {
        warn!(
            product = %sale.product_name,
            quantity = sale.quantity,
            "sales for product with no inventory row dropped"
        );
    }

    let summary = compute_summary(&rows, unmatched);

    Ok(ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            thresholds: config.thresholds,
        },
        summary,
        rows,
    })
}

/// Left-join aggregated sales onto inventory and classify each product.
///
/// One output row per inventory record, in input order. Products missing from
/// `sales` count as zero sold. Remaining stock is not clamped.
pub fn reconcile(
    inventory: &[InventoryRecord],
    sales: &SalesAggregate,
    thresholds: &Thresholds,
) -> Vec<ReconciledRow> {
    inventory
        .iter()
        .map(|record| {
            let key = normalize(&record.product_name);
            let quantity_sold = sales.get(&key).copied().unwrap_or(0.0);
            let remaining_stock = record.quantity_in_store - quantity_sold;
            let (stock_status, overstock_status) =
                classify(remaining_stock, record.quantity_in_store, thresholds);
            ReconciledRow {
                product_name: key,
                quantity_in_store: record.quantity_in_store,
                quantity_sold,
                remaining_stock,
                stock_status,
                overstock_status,
            }
        })
        .collect()
}

/// Aggregated sales whose key matches no inventory record, sorted by key.
pub fn unmatched_sales(inventory: &[InventoryRecord], sales: &SalesAggregate) -> Vec<UnmatchedSale> {
    let known: std::collections::HashSet<String> =
        inventory.iter().map(|r| normalize(&r.product_name)).collect();

    sales
        .iter()
        .filter(|(key, _)| !known.contains(*key))
        .map(|(key, &quantity)| UnmatchedSale {
            product_name: key.clone(),
            quantity,
        })
        .collect()
}

/// Apply the duplicate-key policy to the inventory table.
///
/// `Error` fails listing every repeated key. `First` / `Last` keep a single
/// record per key, at the position of the kept record.
pub fn resolve_duplicates(
    inventory: &[InventoryRecord],
    policy: DuplicatePolicy,
) -> Result<Vec<InventoryRecord>, ReconError> {
    let keys: Vec<String> = inventory.iter().map(|r| normalize(&r.product_name)).collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for key in &keys {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }
    if counts.values().all(|&c| c == 1) {
        return Ok(inventory.to_vec());
    }

    if policy == DuplicatePolicy::Error {
        let duplicates = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(key, count)| DuplicateKey {
                key: key.to_string(),
                count,
            })
            .collect();
        return Err(ReconError::DuplicateKey(duplicates));
    }

    // Index of the record that survives for each key.
    let mut keep: HashMap<&str, usize> = HashMap::new();
    for (i, key) in keys.iter().enumerate() {
        match policy {
            DuplicatePolicy::First => {
                keep.entry(key.as_str()).or_insert(i);
            }
            DuplicatePolicy::Last => {
                keep.insert(key.as_str(), i);
            }
            DuplicatePolicy::Error => unreachable!(),
        }
    }

    let mut kept = Vec::with_capacity(keep.len());
    for (i, (record, key)) in inventory.iter().zip(&keys).enumerate() {
        if keep.get(key.as_str()) == Some(&i) {
            kept.push(record.clone());
        } else {
            warn!(
                product = %key,
                row = i + 1,
                quantity_in_store = record.quantity_in_store,
                "duplicate inventory row discarded"
            );
        }
    }
    Ok(kept)
}

/// Reject non-finite quantities, and negative ones unless the policy allows them.
///
/// Records built by [`crate::load`] have already passed this check against
/// their CSV rows. For records built in code, `row` is the 1-based position
/// in the record list.
pub fn check_quantities(input: &ReconInput, config: &ReconConfig) -> Result<(), ReconError> {
    let policy = config.policy.negative;
    let inventory = input
        .inventory
        .iter()
        .map(|r: &InventoryRecord| r.quantity_in_store);
    check_column(Table::Inventory, &config.inventory.quantity_column, inventory, policy)?;

    let sales = input.sales.iter().map(|r: &SalesRecord| r.quantity);
    check_column(Table::Sales, &config.sales.quantity_column, sales, policy)
}

fn check_column(
    table: Table,
    column: &str,
    values: impl Iterator<Item = f64>,
    policy: NegativePolicy,
) -> Result<(), ReconError> {
    for (i, value) in values.enumerate() {
        let negative_rejected = value < 0.0 && policy == NegativePolicy::Reject;
        if !value.is_finite() || negative_rejected {
            return Err(ReconError::TypeConversion {
                table,
                column: column.into(),
                row: i + 1,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OverstockStatus, StockStatus};

    fn inv(name: &str, qty: f64) -> InventoryRecord {
        InventoryRecord::new(name, qty)
    }

    fn sale(name: &str, qty: f64) -> SalesRecord {
        SalesRecord::new(name, qty)
    }

    fn run_default(inventory: Vec<InventoryRecord>, sales: Vec<SalesRecord>) -> ReconResult {
        run(&ReconConfig::default(), &ReconInput { inventory, sales }).unwrap()
    }

    #[test]
    fn case_variants_merge_into_one_product() {
        let result = run_default(
            vec![inv("Widget", 100.0)],
            vec![sale("widget", 30.0), sale("WIDGET", 20.0)],
        );
        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.product_name, "widget");
        assert_eq!(row.quantity_sold, 50.0);
        assert_eq!(row.remaining_stock, 50.0);
        assert_eq!(row.stock_status, StockStatus::InStock);
        // 50 > 0.2 * 100
        assert_eq!(row.overstock_status, OverstockStatus::PotentialOverstock);
    }

    #[test]
    fn product_without_sales() {
        let result = run_default(vec![inv("Gadget", 10.0)], vec![]);
        let row = &result.rows[0];
        assert_eq!(row.quantity_sold, 0.0);
        assert_eq!(row.remaining_stock, 10.0);
        assert_eq!(row.stock_status, StockStatus::InStock);
        assert_eq!(row.overstock_status, OverstockStatus::PotentialOverstock);
    }

    #[test]
    fn nearly_sold_out_is_low_stock() {
        let result = run_default(vec![inv("Bolt", 50.0)], vec![sale("Bolt", 48.0)]);
        let row = &result.rows[0];
        assert_eq!(row.remaining_stock, 2.0);
        assert_eq!(row.stock_status, StockStatus::LowStock);
        assert_eq!(row.overstock_status, OverstockStatus::NormalStock);
    }

    #[test]
    fn oversold_goes_negative() {
        let result = run_default(vec![inv("Nut", 5.0)], vec![sale("nut", 8.0)]);
        assert_eq!(result.rows[0].remaining_stock, -3.0);
        assert_eq!(result.summary.oversold, 1);
    }

    #[test]
    fn negative_sale_rejected_by_default() {
        let input = ReconInput {
            inventory: vec![inv("Nail", 20.0)],
            sales: vec![sale("Nail", -5.0)],
        };
        let err = run(&ReconConfig::default(), &input).unwrap_err();
        match err {
            ReconError::TypeConversion { table, column, row, value } => {
                assert_eq!(table, Table::Sales);
                assert_eq!(column, "Quantity");
                assert_eq!(row, 1);
                assert_eq!(value, "-5");
            }
            other => panic!("expected TypeConversion, got {other:?}"),
        }
    }

    #[test]
    fn negative_sale_allowed_by_policy() {
        let mut config = ReconConfig::default();
        config.policy.negative = NegativePolicy::Allow;
        let input = ReconInput {
            inventory: vec![inv("Nail", 20.0)],
            sales: vec![sale("Nail", -5.0)],
        };
        let result = run(&config, &input).unwrap();
        assert_eq!(result.rows[0].quantity_sold, -5.0);
        assert_eq!(result.rows[0].remaining_stock, 25.0);
    }

    #[test]
    fn non_finite_quantity_rejected_even_when_negatives_allowed() {
        let mut config = ReconConfig::default();
        config.policy.negative = NegativePolicy::Allow;
        let input = ReconInput {
            inventory: vec![inv("A", 1.0), inv("B", f64::NAN)],
            sales: vec![],
        };
        let err = run(&config, &input).unwrap_err();
        assert!(matches!(
            err,
            ReconError::TypeConversion { table: Table::Inventory, row: 2, .. }
        ));
    }

    #[test]
    fn empty_inventory_is_valid() {
        let result = run_default(vec![], vec![sale("Widget", 3.0)]);
        assert!(result.rows.is_empty());
        assert_eq!(result.summary.products, 0);
        assert_eq!(result.summary.unmatched_sales.len(), 1);
    }

    #[test]
    fn sales_only_products_are_dropped_and_reported() {
        let result = run_default(
            vec![inv("Widget", 10.0)],
            vec![sale("Widget", 1.0), sale("Ghost", 4.0), sale("ghost ", 1.0)],
        );
        assert_eq!(result.rows.len(), 1);
        assert_eq!(
            result.summary.unmatched_sales,
            vec![UnmatchedSale {
                product_name: "ghost".into(),
                quantity: 5.0,
            }]
        );
    }

    #[test]
    fn output_order_follows_inventory() {
        let result = run_default(
            vec![inv("Zeta", 1.0), inv("alpha", 1.0), inv("Mid", 1.0)],
            vec![],
        );
        let names: Vec<_> = result.rows.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn duplicate_inventory_keys_fail_by_default() {
        let input = ReconInput {
            inventory: vec![inv("Widget", 1.0), inv(" widget", 2.0), inv("Bolt", 3.0)],
            sales: vec![],
        };
        let err = run(&ReconConfig::default(), &input).unwrap_err();
        match err {
            ReconError::DuplicateKey(dups) => {
                assert_eq!(dups, vec![DuplicateKey { key: "widget".into(), count: 2 }]);
            }
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_policy_first_keeps_first_position() {
        let inventory = vec![inv("Widget", 1.0), inv("Bolt", 3.0), inv("WIDGET", 2.0)];
        let kept = resolve_duplicates(&inventory, DuplicatePolicy::First).unwrap();
        assert_eq!(kept, vec![inv("Widget", 1.0), inv("Bolt", 3.0)]);
    }

    #[test]
    fn duplicate_policy_last_keeps_last_position() {
        let inventory = vec![inv("Widget", 1.0), inv("Bolt", 3.0), inv("WIDGET", 2.0)];
        let kept = resolve_duplicates(&inventory, DuplicatePolicy::Last).unwrap();
        assert_eq!(kept, vec![inv("Bolt", 3.0), inv("WIDGET", 2.0)]);
    }

    #[test]
    fn reconcile_without_run() {
        let mut sales = SalesAggregate::new();
        sales.insert("gadget".into(), 9.0);
        let rows = reconcile(&[inv(" Gadget ", 10.0)], &sales, &Thresholds::default());
        assert_eq!(rows[0].product_name, "gadget");
        assert_eq!(rows[0].remaining_stock, 1.0);
        // 1 is not < 0.1 * 10
        assert_eq!(rows[0].stock_status, StockStatus::InStock);
    }

    #[test]
    fn meta_carries_thresholds() {
        let mut config = ReconConfig::default();
        config.thresholds.low_stock_ratio = 0.25;
        let result = run(&config, &ReconInput::default()).unwrap();
        assert_eq!(result.meta.thresholds.low_stock_ratio, 0.25);
        assert_eq!(result.meta.engine_version, env!("CARGO_PKG_VERSION"));
    }
}
