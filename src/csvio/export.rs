//! Tabular exports: trades, book snapshots, trader performance, and
//! engine metrics.
//!
//! Fields containing commas, quotes, or newlines are quoted with doubled
//! internal quotes by the writer.

use super::error::CsvError;
use crate::engine::PerformanceStats;
use crate::orderbook::{OrderBook, Trade};
use crate::trader::TraderPerformance;
use crate::utils::current_time_millis;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Render epoch milliseconds as `yyyy-MM-dd hh:mm:ss.SSS` (UTC).
fn format_timestamp(millis: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(millis as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Write trades, one row per trade.
///
/// The `Side` column is the constant string `BUY`: the format follows the
/// aggressive-side convention with the aggressor hard-coded as the buyer.
/// Price carries four decimals, Value two.
pub fn export_trades<W: Write>(writer: W, trades: &[Trade]) -> Result<(), CsvError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "Trade ID",
        "Timestamp",
        "Symbol",
        "Side",
        "Quantity",
        "Price",
        "Value",
        "Buyer ID",
        "Seller ID",
        "Buy Order ID",
        "Sell Order ID",
    ])?;
    for trade in trades {
        csv_writer.write_record(&[
            trade.id.to_string(),
            format_timestamp(trade.timestamp),
            trade.symbol.clone(),
            "BUY".to_string(),
            trade.quantity.to_string(),
            trade.price.to_string(),
            format!("{:.2}", trade.notional()),
            trade.buyer_id.clone(),
            trade.seller_id.clone(),
            trade.buy_order_id.to_string(),
            trade.sell_order_id.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a depth-limited snapshot of one book, bids then asks, one row
/// per level with cumulative volume running down each side. Level 1 is
/// the best level.
pub fn export_order_book<W: Write>(
    writer: W,
    book: &OrderBook,
    depth: usize,
) -> Result<(), CsvError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "Symbol",
        "Timestamp",
        "Side",
        "Price Level",
        "Price",
        "Quantity",
        "Order Count",
        "Cumulative Volume",
    ])?;
    let timestamp = format_timestamp(current_time_millis());
    let depth_view = book.top_levels(depth);
    for (side_name, levels) in [("BID", depth_view.bids), ("ASK", depth_view.asks)] {
        let mut cumulative = 0u64;
        for (index, level) in levels.iter().enumerate() {
            cumulative += level.total_quantity;
            csv_writer.write_record(&[
                book.symbol().to_string(),
                timestamp.clone(),
                side_name.to_string(),
                (index + 1).to_string(),
                level.price.to_string(),
                level.total_quantity.to_string(),
                level.order_count.to_string(),
                cumulative.to_string(),
            ])?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write trader performance, one row per trader.
pub fn export_trader_performance<W: Write>(
    writer: W,
    rows: &[TraderPerformance],
) -> Result<(), CsvError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "Trader ID",
        "Initial Cash",
        "Current Cash",
        "Portfolio Value",
        "Total P&L",
        "P&L %",
        "Orders Sent",
        "Orders Filled",
        "Fill Rate %",
        "Total Volume",
        "Avg Order Size",
    ])?;
    for row in rows {
        csv_writer.write_record(&[
            row.trader_id.clone(),
            format!("{:.2}", row.initial_cash),
            format!("{:.2}", row.cash),
            format!("{:.2}", row.portfolio_value),
            format!("{:.2}", row.total_pnl),
            format!("{:.2}", row.pnl_percent),
            row.orders_sent.to_string(),
            row.orders_filled.to_string(),
            format!("{:.2}", row.fill_rate_percent),
            row.total_volume.to_string(),
            format!("{:.2}", row.avg_order_size),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write engine metrics, one row per metric with its unit.
pub fn export_engine_metrics<W: Write>(
    writer: W,
    stats: &PerformanceStats,
) -> Result<(), CsvError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Metric", "Value", "Unit"])?;
    let rows = [
        ("Total Trades", stats.total_trades.to_string(), "trades"),
        ("Total Volume", stats.total_volume.to_string(), "shares"),
        (
            "Trades Per Second",
            format!("{:.2}", stats.trades_per_second),
            "trades/s",
        ),
        (
            "Orders Per Second",
            format!("{:.2}", stats.orders_per_second),
            "orders/s",
        ),
        (
            "Average Latency",
            format!("{:.3}", stats.avg_latency_ms),
            "ms",
        ),
        ("Active Orders", stats.active_orders.to_string(), "orders"),
        (
            "Runtime",
            format!("{:.1}", stats.runtime_seconds),
            "seconds",
        ),
        (
            "Active Symbols",
            stats.symbols_active.to_string(),
            "symbols",
        ),
    ];
    for (metric, value, unit) in rows {
        csv_writer.write_record([metric, value.as_str(), unit])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write trades to a file on disk.
pub fn export_trades_to_path(path: impl AsRef<Path>, trades: &[Trade]) -> Result<(), CsvError> {
    export_trades(BufWriter::new(File::create(path)?), trades)
}

/// Write a book snapshot to a file on disk.
pub fn export_order_book_to_path(
    path: impl AsRef<Path>,
    book: &OrderBook,
    depth: usize,
) -> Result<(), CsvError> {
    export_order_book(BufWriter::new(File::create(path)?), book, depth)
}

/// Write trader performance to a file on disk.
pub fn export_trader_performance_to_path(
    path: impl AsRef<Path>,
    rows: &[TraderPerformance],
) -> Result<(), CsvError> {
    export_trader_performance(BufWriter::new(File::create(path)?), rows)
}

/// Write engine metrics to a file on disk.
pub fn export_engine_metrics_to_path(
    path: impl AsRef<Path>,
    stats: &PerformanceStats,
) -> Result<(), CsvError> {
    export_engine_metrics(BufWriter::new(File::create(path)?), stats)
}
