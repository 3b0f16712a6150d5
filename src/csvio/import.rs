//! Order batch ingest from CSV.
//!
//! Parsed rows become orders submitted through the same
//! [`MatchingEngine::submit`] entry point traders use. Row failures are
//! collected by line number and never stop the batch.

use super::error::CsvError;
use crate::engine::MatchingEngine;
use crate::types::{Order, Price, Side};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns every order CSV must carry (case-insensitive, any order).
/// `timestamp` is accepted and ignored; the engine assigns submit times.
const REQUIRED_COLUMNS: [&str; 5] = ["trader_id", "symbol", "side", "quantity", "price"];

/// One rejected row, by 1-based data-row number.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    /// Data-row number, first row after the header = 1.
    pub line: u64,
    /// Why the row was rejected.
    pub message: String,
}

/// Outcome of one CSV import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// `true` when every data row became a submitted order.
    pub success: bool,
    /// Orders accepted and enqueued.
    pub orders_submitted: usize,
    /// Rows rejected by validation or submission.
    pub orders_failed: usize,
    /// Data rows seen (excluding the header).
    pub total_rows: usize,
    /// Per-row failures, in row order.
    pub errors: Vec<RowError>,
    /// Distinct symbols among submitted orders, sorted.
    pub symbols_imported: Vec<String>,
    /// Distinct trader ids among submitted orders, sorted.
    pub traders_imported: Vec<String>,
}

/// Parse a header-bearing order table and submit each valid row.
///
/// # Errors
/// [`CsvError::MissingColumns`] when the header lacks required columns
/// (the batch is not partially applied), or [`CsvError::Csv`] when the
/// header itself cannot be read. Row-level failures land in the report.
pub fn import_orders<R: Read>(
    reader: R,
    engine: &MatchingEngine,
) -> Result<ImportReport, CsvError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.trim().to_ascii_lowercase(), index))
        .collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !columns.contains_key(**column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CsvError::MissingColumns { columns: missing });
    }

    let mut orders_submitted = 0;
    let mut errors = Vec::new();
    let mut total_rows = 0;
    let mut symbols = BTreeSet::new();
    let mut traders = BTreeSet::new();

    for (index, record) in csv_reader.records().enumerate() {
        let line = index as u64 + 1;
        total_rows += 1;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                errors.push(RowError {
                    line,
                    message: err.to_string(),
                });
                continue;
            }
        };
        match parse_row(&record, &columns) {
            Ok(order) => {
                let symbol = order.symbol().to_string();
                let trader_id = order.trader_id().to_string();
                match engine.submit(order) {
                    Ok(order_id) => {
                        debug!(%order_id, line, "imported order");
                        orders_submitted += 1;
                        symbols.insert(symbol);
                        traders.insert(trader_id);
                    }
                    Err(err) => errors.push(RowError {
                        line,
                        message: err.to_string(),
                    }),
                }
            }
            Err(message) => errors.push(RowError { line, message }),
        }
    }

    let orders_failed = errors.len();
    info!(
        orders_submitted,
        orders_failed, total_rows, "order import finished"
    );
    Ok(ImportReport {
        success: orders_failed == 0,
        orders_submitted,
        orders_failed,
        total_rows,
        errors,
        symbols_imported: symbols.into_iter().collect(),
        traders_imported: traders.into_iter().collect(),
    })
}

/// Import orders from a CSV file on disk.
pub fn import_orders_from_path(
    path: impl AsRef<Path>,
    engine: &MatchingEngine,
) -> Result<ImportReport, CsvError> {
    import_orders(File::open(path)?, engine)
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &HashMap<String, usize>,
) -> Result<Order, String> {
    let field = |name: &str| -> &str {
        columns
            .get(name)
            .and_then(|&index| record.get(index))
            .unwrap_or("")
    };

    let trader_id = field("trader_id");
    if trader_id.is_empty() {
        return Err("empty trader_id".to_string());
    }
    let symbol = field("symbol");
    if symbol.is_empty() {
        return Err("empty symbol".to_string());
    }
    let side: Side = field("side").parse().map_err(|e| format!("{e}"))?;
    let quantity: u64 = field("quantity")
        .parse()
        .map_err(|_| format!("invalid quantity: {:?}", field("quantity")))?;
    let price: Price = field("price")
        .parse()
        .map_err(|_| format!("invalid price: {:?}", field("price")))?;
    Order::new(trader_id, symbol, side, quantity, price).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn engine() -> Arc<MatchingEngine> {
        Arc::new(MatchingEngine::new())
    }

    #[test]
    fn imports_valid_rows() {
        let engine = engine();
        let csv = "trader_id,symbol,side,quantity,price\n\
                   T1,AAPL,BUY,10,150.00\n\
                   T2,msft,sell,5,310.25\n";
        let report = import_orders(csv.as_bytes(), &engine).unwrap();
        assert!(report.success);
        assert_eq!(report.orders_submitted, 2);
        assert_eq!(report.orders_failed, 0);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.symbols_imported, vec!["AAPL", "MSFT"]);
        assert_eq!(report.traders_imported, vec!["T1", "T2"]);
        assert_eq!(engine.pending_orders(), 2);
    }

    #[test]
    fn header_columns_are_case_insensitive_and_reorderable() {
        let engine = engine();
        let csv = "Price,QUANTITY,Side,Symbol,Trader_ID,note\n\
                   99.5,10,buy,TEST,T1,ignored\n";
        let report = import_orders(csv.as_bytes(), &engine).unwrap();
        assert_eq!(report.orders_submitted, 1);
    }

    #[test]
    fn missing_columns_fail_with_enumerated_list() {
        let engine = engine();
        let csv = "trader_id,symbol,quantity\nT1,AAPL,10\n";
        let err = import_orders(csv.as_bytes(), &engine).unwrap_err();
        match err {
            CsvError::MissingColumns { columns } => {
                assert_eq!(columns, vec!["side", "price"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(engine.pending_orders(), 0);
    }

    #[test]
    fn bad_rows_are_reported_by_line_and_skipped() {
        let engine = engine();
        let csv = "trader_id,symbol,side,quantity,price\n\
                   T1,AAPL,BUY,10,150.00\n\
                   T2,AAPL,SELL,10,150.00\n\
                   T3,AAPL,HOLD,10,150.00\n\
                   T4,AAPL,BUY,-5,150.00\n";
        let report = import_orders(csv.as_bytes(), &engine).unwrap();
        assert!(!report.success);
        assert_eq!(report.orders_submitted, 2);
        assert_eq!(report.orders_failed, 2);
        assert_eq!(report.total_rows, 4);
        let lines: Vec<u64> = report.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert_eq!(engine.pending_orders(), 2);
    }

    #[test]
    fn timestamp_column_is_informational() {
        let engine = engine();
        let csv = "trader_id,symbol,side,quantity,price,timestamp\n\
                   T1,AAPL,BUY,10,150.00,2020-01-01 00:00:00.000\n";
        let report = import_orders(csv.as_bytes(), &engine).unwrap();
        assert_eq!(report.orders_submitted, 1);
    }
}
