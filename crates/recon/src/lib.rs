//! `stockcheck-recon`: inventory vs. sales stock reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns classified results.
//! The `load` module turns CSV text into records; no file or CLI dependencies.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod load;
pub mod model;
pub mod normalize;
pub mod rank;
pub mod summary;

pub use aggregate::{aggregate_sales, SalesAggregate};
pub use config::{ReconConfig, Thresholds};
pub use engine::{reconcile, run};
pub use error::{ReconError, Table};
pub use load::{load_sales, load_tables};
pub use model::{
    InventoryRecord, OverstockStatus, ReconInput, ReconResult, ReconciledRow, SalesRecord,
    StockStatus,
};
pub use normalize::normalize;
pub use rank::{rank_products, RankOrder, RankedProduct, SaleWindow};
