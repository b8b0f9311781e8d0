//! CSV → engine records.
//!
//! Header rows of both tables are checked against the configured column
//! names before any value is parsed, so a schema problem in either file is
//! reported without partial work. Quantity cells are checked against the
//! negative policy here, so errors point at the CSV row and header name.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{InventoryColumns, NegativePolicy, ReconConfig, SalesColumns};
use crate::error::{ReconError, Table};
use crate::model::{InventoryRecord, ReconInput, SalesRecord};

/// Load both tables for a reconciliation run.
pub fn load_tables(
    inventory_csv: &str,
    sales_csv: &str,
    config: &ReconConfig,
) -> Result<ReconInput, ReconError> {
    let mut inventory_reader = reader(inventory_csv);
    let mut sales_reader = reader(sales_csv);

    let negative = config.policy.negative;
    let inventory_layout = InventoryLayout::resolve(
        &read_headers(&mut inventory_reader, Table::Inventory)?,
        &config.inventory,
        negative,
    )?;
    let sales_layout = SalesLayout::resolve(
        &read_headers(&mut sales_reader, Table::Sales)?,
        &config.sales,
        negative,
    )?;

    let inventory = inventory_layout.read(&mut inventory_reader)?;
    let sales = sales_layout.read(&mut sales_reader, &config.sales.date_format)?;

    debug!(
        inventory_rows = inventory.len(),
        sales_rows = sales.len(),
        "loaded tables"
    );

    Ok(ReconInput { inventory, sales })
}

/// Load only the sales table (ranking reports).
pub fn load_sales(sales_csv: &str, config: &ReconConfig) -> Result<Vec<SalesRecord>, ReconError> {
    let mut sales_reader = reader(sales_csv);
    let layout = SalesLayout::resolve(
        &read_headers(&mut sales_reader, Table::Sales)?,
        &config.sales,
        config.policy.negative,
    )?;
    layout.read(&mut sales_reader, &config.sales.date_format)
}

/// Parse a quantity cell: surrounding whitespace and thousands separators
/// are accepted; empty, non-numeric and non-finite values are not.
pub fn parse_quantity(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn reader(data: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes())
}

fn read_headers(reader: &mut csv::Reader<&[u8]>, table: Table) -> Result<Vec<String>, ReconError> {
    let headers = reader.headers().map_err(|e| csv_err(table, e))?;
    Ok(headers.iter().map(|h| h.trim().to_string()).collect())
}

fn csv_err(table: Table, e: csv::Error) -> ReconError {
    ReconError::Csv {
        table,
        message: e.to_string(),
    }
}

fn column_index(headers: &[String], table: Table, name: &str) -> Result<usize, ReconError> {
    headers
        .iter()
        .position(|h| h == name.trim())
        .ok_or_else(|| ReconError::Schema {
            table,
            column: name.into(),
        })
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn quantity_at(
    record: &csv::StringRecord,
    idx: usize,
    table: Table,
    column: &str,
    row: usize,
    negative: NegativePolicy,
) -> Result<f64, ReconError> {
    let raw = record.get(idx).unwrap_or("");
    parse_quantity(raw)
        .filter(|v| *v >= 0.0 || negative == NegativePolicy::Allow)
        .ok_or_else(|| ReconError::TypeConversion {
            table,
            column: column.into(),
            row,
            value: raw.trim().into(),
        })
}

struct InventoryLayout<'a> {
    product_idx: usize,
    quantity_idx: usize,
    quantity_column: &'a str,
    negative: NegativePolicy,
}

impl<'a> InventoryLayout<'a> {
    fn resolve(
        headers: &[String],
        columns: &'a InventoryColumns,
        negative: NegativePolicy,
    ) -> Result<Self, ReconError> {
        Ok(Self {
            product_idx: column_index(headers, Table::Inventory, &columns.product_column)?,
            quantity_idx: column_index(headers, Table::Inventory, &columns.quantity_column)?,
            quantity_column: &columns.quantity_column,
            negative,
        })
    }

    fn read(&self, reader: &mut csv::Reader<&[u8]>) -> Result<Vec<InventoryRecord>, ReconError> {
        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| csv_err(Table::Inventory, e))?;
            if is_blank(&record) {
                continue;
            }
            let quantity_in_store = quantity_at(
                &record,
                self.quantity_idx,
                Table::Inventory,
                self.quantity_column,
                i + 1,
                self.negative,
            )?;
            rows.push(InventoryRecord {
                product_name: record.get(self.product_idx).unwrap_or("").to_string(),
                quantity_in_store,
            });
        }
        Ok(rows)
    }
}

struct SalesLayout<'a> {
    product_idx: usize,
    quantity_idx: usize,
    date_idx: Option<usize>,
    quantity_column: &'a str,
    negative: NegativePolicy,
}

impl<'a> SalesLayout<'a> {
    fn resolve(
        headers: &[String],
        columns: &'a SalesColumns,
        negative: NegativePolicy,
    ) -> Result<Self, ReconError> {
        // The date column is optional: only ranking windows need it.
        let date_idx = columns
            .date_column
            .as_deref()
            .and_then(|name| column_index(headers, Table::Sales, name).ok());
        Ok(Self {
            product_idx: column_index(headers, Table::Sales, &columns.product_column)?,
            quantity_idx: column_index(headers, Table::Sales, &columns.quantity_column)?,
            date_idx,
            quantity_column: &columns.quantity_column,
            negative,
        })
    }

    fn read(
        &self,
        reader: &mut csv::Reader<&[u8]>,
        date_format: &str,
    ) -> Result<Vec<SalesRecord>, ReconError> {
        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| csv_err(Table::Sales, e))?;
            if is_blank(&record) {
                continue;
            }
            let quantity = quantity_at(
                &record,
                self.quantity_idx,
                Table::Sales,
                self.quantity_column,
                i + 1,
                self.negative,
            )?;
            let date = self.date_idx.and_then(|idx| {
                let raw = record.get(idx).unwrap_or("").trim();
                let parsed = NaiveDate::parse_from_str(raw, date_format).ok();
                if parsed.is_none() && !raw.is_empty() {
                    debug!(row = i + 1, value = raw, "unparseable sale date ignored");
                }
                parsed
            });
            rows.push(SalesRecord {
                product_name: record.get(self.product_idx).unwrap_or("").to_string(),
                quantity,
                date,
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = "\
Product_Name,Quantity_in_Store
Widget,100
Gadget,10
";

    const SALES: &str = "\
Date,Product_Name,Quantity,Total
01/04/2023,widget,30,300
15/04/2023,WIDGET,20,200
";

    #[test]
    fn load_basic() {
        let input = load_tables(INVENTORY, SALES, &ReconConfig::default()).unwrap();
        assert_eq!(input.inventory.len(), 2);
        assert_eq!(input.inventory[0], InventoryRecord::new("Widget", 100.0));
        assert_eq!(input.sales.len(), 2);
        assert_eq!(input.sales[1].product_name, "WIDGET");
        assert_eq!(input.sales[1].quantity, 20.0);
        assert_eq!(input.sales[1].date, NaiveDate::from_ymd_opt(2023, 4, 15));
    }

    #[test]
    fn missing_inventory_column_reported_before_sales_parse() {
        let bad_sales = "Product_Name,Quantity\nWidget,abc\n";
        let err = load_tables("Product_Name,Stock\nWidget,1\n", bad_sales, &ReconConfig::default())
            .unwrap_err();
        match err {
            ReconError::Schema { table, column } => {
                assert_eq!(table, Table::Inventory);
                assert_eq!(column, "Quantity_in_Store");
            }
            other => panic!("expected Schema, got {other:?}"),
        }
    }

    #[test]
    fn missing_sales_column_reported_before_inventory_values() {
        // Inventory has a bad value, but the sales schema error wins.
        let bad_inventory = "Product_Name,Quantity_in_Store\nWidget,lots\n";
        let err = load_tables(bad_inventory, "Product_Name,Qty\n", &ReconConfig::default())
            .unwrap_err();
        assert!(
            matches!(err, ReconError::Schema { table: Table::Sales, ref column } if column == "Quantity"),
            "got {err:?}"
        );
    }

    #[test]
    fn non_numeric_quantity_is_an_error() {
        let sales = "Product_Name,Quantity\nWidget,3\nWidget,three\n";
        let err = load_tables(INVENTORY, sales, &ReconConfig::default()).unwrap_err();
        match err {
            ReconError::TypeConversion { table, column, row, value } => {
                assert_eq!(table, Table::Sales);
                assert_eq!(column, "Quantity");
                assert_eq!(row, 2);
                assert_eq!(value, "three");
            }
            other => panic!("expected TypeConversion, got {other:?}"),
        }
    }

    #[test]
    fn empty_quantity_is_not_zero() {
        let inventory = "Product_Name,Quantity_in_Store\nWidget,\n";
        let err = load_tables(inventory, "Product_Name,Quantity\n", &ReconConfig::default());
        assert!(matches!(err, Err(ReconError::TypeConversion { .. })));
    }

    #[test]
    fn blank_rows_skipped() {
        let inventory = "Product_Name,Quantity_in_Store\nWidget,5\n,\nBolt,7\n";
        let input = load_tables(inventory, "Product_Name,Quantity\n", &ReconConfig::default()).unwrap();
        assert_eq!(input.inventory.len(), 2);
    }

    #[test]
    fn header_whitespace_tolerated() {
        let inventory = " Product_Name , Quantity_in_Store \nWidget,5\n";
        let input = load_tables(inventory, "Product_Name,Quantity\n", &ReconConfig::default()).unwrap();
        assert_eq!(input.inventory[0].quantity_in_store, 5.0);
    }

    #[test]
    fn custom_columns() {
        let config = ReconConfig::from_toml(
            "[inventory]\nproduct_column = \"Item\"\nquantity_column = \"On_Hand\"\n\
             [sales]\nproduct_column = \"Item\"\nquantity_column = \"Qty\"\n",
        )
        .unwrap();
        let input = load_tables("Item,On_Hand\nA,4\n", "Item,Qty\nA,1\n", &config).unwrap();
        assert_eq!(input.inventory[0].quantity_in_store, 4.0);
        assert_eq!(input.sales[0].quantity, 1.0);
        assert_eq!(input.sales[0].date, None);
    }

    #[test]
    fn bad_date_becomes_none() {
        let sales = "Date,Product_Name,Quantity\nOrder Date,Widget,1\n31/12/2023,Widget,2\n";
        let records = load_sales(sales, &ReconConfig::default()).unwrap();
        assert_eq!(records[0].date, None);
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[test]
    fn ragged_row_is_csv_error() {
        let inventory = "Product_Name,Quantity_in_Store\nWidget,5,extra\n";
        let err = load_tables(inventory, "Product_Name,Quantity\n", &ReconConfig::default());
        assert!(matches!(err, Err(ReconError::Csv { table: Table::Inventory, .. })));
    }

    #[test]
    fn negative_quantity_reports_csv_row_and_header() {
        // Blank rows still count toward the row number.
        let inventory = "Product_Name,Quantity_in_Store\n,\n,\nNail,-5\n";
        let err = load_tables(inventory, "Product_Name,Quantity\n", &ReconConfig::default())
            .unwrap_err();
        match err {
            ReconError::TypeConversion { table, column, row, value } => {
                assert_eq!(table, Table::Inventory);
                assert_eq!(column, "Quantity_in_Store");
                assert_eq!(row, 3);
                assert_eq!(value, "-5");
            }
            other => panic!("expected TypeConversion, got {other:?}"),
        }

        // A non-numeric value in the same cell names the same position.
        let inventory = "Product_Name,Quantity_in_Store\n,\n,\nNail,abc\n";
        let err = load_tables(inventory, "Product_Name,Quantity\n", &ReconConfig::default())
            .unwrap_err();
        assert!(
            matches!(err, ReconError::TypeConversion { row: 3, ref column, .. } if column == "Quantity_in_Store"),
            "got {err:?}"
        );
    }

    #[test]
    fn negative_sale_uses_configured_header() {
        let config = ReconConfig::from_toml("[sales]\nquantity_column = \"Qty\"\n").unwrap();
        let err = load_sales("Product_Name,Qty\nNail,2\n,\nNail,-5\n", &config).unwrap_err();
        assert_eq!(err.to_string(), "sales table, row 3: cannot use '-5' as Qty");
    }

    #[test]
    fn negative_quantity_loads_when_allowed() {
        let config = ReconConfig::from_toml("[policy]\nnegative = \"allow\"\n").unwrap();
        let records = load_sales("Product_Name,Quantity\nNail,-5\n", &config).unwrap();
        assert_eq!(records[0].quantity, -5.0);
    }

    #[test]
    fn parse_quantity_forms() {
        assert_eq!(parse_quantity("12"), Some(12.0));
        assert_eq!(parse_quantity(" 1,250 "), Some(1250.0));
        assert_eq!(parse_quantity("2.5"), Some(2.5));
        assert_eq!(parse_quantity("-5"), Some(-5.0));
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("NaN"), None);
        assert_eq!(parse_quantity("inf"), None);
        assert_eq!(parse_quantity("12 units"), None);
    }
}
