use std::collections::BTreeMap;

use crate::model::SalesRecord;
use crate::normalize::normalize;

/// Total quantity sold per normalized product key.
///
/// Products with no transactions have no entry; callers decide what absence
/// means.
pub type SalesAggregate = BTreeMap<String, f64>;

/// Group sales by normalized product name and sum quantities.
pub fn aggregate_sales(records: &[SalesRecord]) -> SalesAggregate {
    aggregate_iter(records.iter())
}

/// Same as [`aggregate_sales`] over any borrowed sequence, so filtered views
/// don't need to be collected first.
pub fn aggregate_iter<'a>(records: impl IntoIterator<Item = &'a SalesRecord>) -> SalesAggregate {
    let mut totals = SalesAggregate::new();
    for record in records {
        *totals.entry(normalize(&record.product_name)).or_insert(0.0) += record.quantity;
    }
    totals
}
