//! Text, JSON and CSV renderings of engine results.

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use stockcheck_recon::{RankedProduct, ReconResult, ReconciledRow};

/// Output columns, in order, matching the original report headings.
pub const RECON_HEADERS: [&str; 6] = [
    "Product_Name",
    "Quantity_in_Store",
    "Quantity",
    "Remaining Stock",
    "Stock Status",
    "Overstock Status",
];

fn recon_cells(row: &ReconciledRow) -> [String; 6] {
    [
        row.product_name.clone(),
        row.quantity_in_store.to_string(),
        row.quantity_sold.to_string(),
        row.remaining_stock.to_string(),
        row.stock_status.to_string(),
        row.overstock_status.to_string(),
    ]
}

/// Aligned plain-text table. Numeric columns are right-aligned.
pub fn recon_table(result: &ReconResult) -> String {
    let rows: Vec<Vec<String>> = result.rows.iter().map(|r| recon_cells(r).to_vec()).collect();
    aligned(&RECON_HEADERS, &rows, &[1, 2, 3])
}

pub fn recon_csv(result: &ReconResult) -> Result<String, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(RECON_HEADERS).map_err(|e| e.to_string())?;
    for row in &result.rows {
        writer.write_record(recon_cells(row)).map_err(|e| e.to_string())?;
    }
    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

pub fn json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization error: {e}"))
}

pub fn ranking_table(ranked: &[RankedProduct]) -> String {
    let rows: Vec<Vec<String>> = ranked
        .iter()
        .map(|r| vec![r.rank.to_string(), r.product_name.clone(), r.quantity.to_string()])
        .collect();
    aligned(&["Rank", "Product_Name", "Quantity"], &rows, &[0, 2])
}

fn aligned(headers: &[&str], rows: &[Vec<String>], right: &[usize]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let header_cells: Vec<&str> = headers.to_vec();
    let mut out = format_line(&header_cells, &widths, right);
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(|s| s.as_str()).collect();
        out.push_str(&format_line(&cells, &widths, right));
        out.push('\n');
    }
    out
}

fn format_line(cells: &[&str], widths: &[usize], right: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let pad = " ".repeat(widths[i] - cell.width());
            if right.contains(&i) {
                format!("{pad}{cell}")
            } else {
                format!("{cell}{pad}")
            }
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}
