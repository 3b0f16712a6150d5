//! The CSV port: batch order ingest and tabular export.

mod error;
mod export;
mod import;

pub use error::CsvError;
pub use export::{
    export_engine_metrics, export_engine_metrics_to_path, export_order_book,
    export_order_book_to_path, export_trader_performance, export_trader_performance_to_path,
    export_trades, export_trades_to_path,
};
pub use import::{ImportReport, RowError, import_orders, import_orders_from_path};
