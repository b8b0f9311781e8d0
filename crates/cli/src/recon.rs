//! `stockcheck run` / `top` / `validate`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use stockcheck_recon::model::StockStatus;
use stockcheck_recon::{load_sales, load_tables, rank_products, RankOrder, RankedProduct, ReconConfig, SaleWindow};

use crate::exit_codes::EXIT_LOW_STOCK;
use crate::render;
use crate::{CliError, OutputFormat};

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))
}

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    match path {
        Some(path) => {
            let config = ReconConfig::from_toml(&read_file(path)?)?;
            tracing::debug!(path = %path.display(), windows = config.windows.len(), "loaded config");
            Ok(config)
        }
        None => Ok(ReconConfig::default()),
    }
}

fn emit(text: &str, output_file: Option<&Path>) -> Result<(), CliError> {
    match output_file {
        Some(path) => {
            std::fs::write(path, text)
                .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

pub fn cmd_run(
    inventory_path: PathBuf,
    sales_path: PathBuf,
    config_path: Option<PathBuf>,
    format: OutputFormat,
    output_file: Option<PathBuf>,
    fail_on_low_stock: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;

    let inventory_csv = read_file(&inventory_path)?;
    let sales_csv = read_file(&sales_path)?;
    let input = load_tables(&inventory_csv, &sales_csv, &config)?;

    let result = stockcheck_recon::run(&config, &input)?;

    let text = match format {
        OutputFormat::Table => render::recon_table(&result),
        OutputFormat::Json => render::json(&result).map_err(CliError::general)?,
        OutputFormat::Csv => render::recon_csv(&result).map_err(CliError::general)?,
    };
    emit(&text, output_file.as_deref())?;

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{} products: {} low stock, {} in stock, {} potential over-stock, {} oversold",
        s.products, s.low_stock, s.in_stock, s.potential_overstock, s.oversold,
    );
    if !s.unmatched_sales.is_empty() {
        let names: Vec<&str> = s.unmatched_sales.iter().map(|u| u.product_name.as_str()).collect();
        eprintln!(
            "dropped sales for {} product(s) not in inventory: {}",
            names.len(),
            names.join(", "),
        );
    }

    if fail_on_low_stock && result.rows.iter().any(|r| r.stock_status == StockStatus::LowStock) {
        return Err(CliError {
            code: EXIT_LOW_STOCK,
            message: format!("{} product(s) low on stock", s.low_stock),
            hint: None,
        });
    }

    Ok(())
}

#[derive(Serialize)]
struct RankingOutput<'a> {
    window: Option<String>,
    order: &'static str,
    products: &'a [RankedProduct],
}

pub fn cmd_top(
    sales_path: PathBuf,
    config_path: Option<PathBuf>,
    window: Option<String>,
    named: Option<String>,
    limit: usize,
    least: bool,
    json_output: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;

    let window: Option<SaleWindow> = match (window, named) {
        (Some(range), _) => Some(
            range
                .parse()
                .map_err(|e: String| CliError::args(format!("--window: {e}")))?,
        ),
        (None, Some(name)) => Some(config.window(&name).ok_or_else(|| {
            let known: Vec<&str> = config.windows.iter().map(|w| w.name.as_str()).collect();
            let err = CliError::args(format!("no window named '{name}' in config"));
            if known.is_empty() {
                err.with_hint("declare windows with [[windows]] name = \"...\" range = \"MM-DD..MM-DD\"")
            } else {
                err.with_hint(format!("known windows: {}", known.join(", ")))
            }
        })?),
        (None, None) => None,
    };

    let sales = load_sales(&read_file(&sales_path)?, &config)?;
    if window.is_some() && !sales.is_empty() && sales.iter().all(|s| s.date.is_none()) {
        eprintln!(
            "warning: no sale dates parsed (column '{}', format '{}')",
            config.sales.date_column.as_deref().unwrap_or(""),
            config.sales.date_format,
        );
    }

    let order = if least { RankOrder::Least } else { RankOrder::Most };
    let ranked = rank_products(&sales, window.as_ref(), limit, order);

    if json_output {
        let out = RankingOutput {
            window: window.map(|w| w.to_string()),
            order: if least { "least" } else { "most" },
            products: &ranked,
        };
        println!("{}", render::json(&out).map_err(CliError::general)?);
    } else {
        print!("{}", render::ranking_table(&ranked));
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "valid: low_stock_ratio={}, overstock_ratio={}, {} window(s)",
        config.thresholds.low_stock_ratio,
        config.thresholds.overstock_ratio,
        config.windows.len(),
    );
    Ok(())
}
