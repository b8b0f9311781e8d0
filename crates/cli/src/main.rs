// stockcheck CLI - inventory vs. sales reconciliation and best-seller reports

mod exit_codes;
mod recon;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use stockcheck_recon::ReconError;

#[derive(Parser)]
#[command(name = "stockcheck")]
#[command(about = "Reconcile store inventory against sales exports")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log engine decisions (dropped sales, discarded duplicates) to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute remaining stock per product and classify it
    #[command(after_help = "\
Sales for products that are not in the inventory file are dropped from the
report and listed on stderr.

Examples:
  stockcheck run --inventory origin.csv --sales sales.csv
  stockcheck run --inventory origin.csv --sales sales.csv --format json
  stockcheck run --inventory origin.csv --sales sales.csv --format csv -o stock.csv
  stockcheck run --inventory origin.csv --sales sales.csv --config stock.toml --fail-on-low-stock")]
    Run {
        /// Inventory snapshot CSV (Product_Name, Quantity_in_Store)
        #[arg(long)]
        inventory: PathBuf,

        /// Sales transactions CSV (Product_Name, Quantity)
        #[arg(long)]
        sales: PathBuf,

        /// TOML config (column names, thresholds, policies)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, short = 'f', value_enum, default_value = "table")]
        format: OutputFormat,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Exit 7 if any product is low on stock
        #[arg(long)]
        fail_on_low_stock: bool,
    },

    /// Rank products by quantity sold
    #[command(after_help = "\
Windows are inclusive month-day ranges that recur every year. A window whose
start is after its end wraps over the new year.

Examples:
  stockcheck top --sales sales.csv
  stockcheck top --sales sales.csv --window 04-10..04-30 --limit 5
  stockcheck top --sales sales.csv --config festivals.toml --named Thingyan --least
  stockcheck top --sales sales.csv --json")]
    Top {
        /// Sales transactions CSV
        #[arg(long)]
        sales: PathBuf,

        /// TOML config (column names, date format, named windows)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Month-day window, MM-DD..MM-DD
        #[arg(long, conflicts_with = "named")]
        window: Option<String>,

        /// Window declared in the config file
        #[arg(long)]
        named: Option<String>,

        /// Number of products to list
        #[arg(long, short = 'n', default_value_t = 10)]
        limit: usize,

        /// List least sold products instead of best sellers
        #[arg(long)]
        least: bool,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  stockcheck validate stock.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  stockcheck-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            inventory,
            sales,
            config,
            format,
            output,
            fail_on_low_stock,
        } => recon::cmd_run(inventory, sales, config, format, output, fail_on_low_stock),
        Commands::Top {
            sales,
            config,
            window,
            named,
            limit,
            least,
            json,
        } => recon::cmd_top(sales, config, window, named, limit, least, json),
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::Schema { .. } => {
                Some("map column names with --config ([inventory] / [sales] sections)".to_string())
            }
            ReconError::DuplicateKey(_) => {
                Some("set [policy] duplicates = \"first\" or \"last\" to keep one row".to_string())
            }
            ReconError::TypeConversion { value, .. } if value.starts_with('-') => {
                Some("set [policy] negative = \"allow\" to accept returns".to_string())
            }
            _ => None,
        };
        Self {
            code: recon_exit_code(&err),
            message: err.to_string(),
            hint,
        }
    }
}
