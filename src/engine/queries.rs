//! Observability queries over engine state.
//!
//! Everything here copies snapshots out under short guards; none of these
//! calls blocks matching for longer than a ring or index copy.

use super::engine::MatchingEngine;
use super::stats::PerformanceStats;
use crate::orderbook::Trade;
use crate::types::{Order, OrderId, Price};
use crate::utils::{current_time_millis, lock};
use serde::Serialize;

/// One symbol's line in the market summary.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolSummary {
    /// Instrument tag.
    pub symbol: String,
    /// Highest resting bid, if any.
    pub best_bid: Option<Price>,
    /// Lowest resting ask, if any.
    pub best_ask: Option<Price>,
    /// `best_ask − best_bid` when both sides are populated.
    pub spread: Option<f64>,
    /// `(best_bid + best_ask) / 2` when both sides are populated.
    pub mid_price: Option<f64>,
    /// Price of the most recent trade in this book.
    pub last_trade_price: Option<Price>,
    /// Orders resting on both sides.
    pub resting_orders: usize,
}

/// Cross-symbol market overview.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSummary {
    /// Epoch milliseconds when the summary was taken.
    pub timestamp: u64,
    /// One entry per known symbol, sorted by symbol.
    pub symbols: Vec<SymbolSummary>,
}

/// Trade statistics for one symbol, computed over the book's retained
/// trade tail.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolStatistics {
    /// Instrument tag.
    pub symbol: String,
    /// Trades in the retained tail.
    pub trade_count: usize,
    /// Shares traded in the retained tail.
    pub volume: u64,
    /// Highest trade price in the tail.
    pub high: Option<Price>,
    /// Lowest trade price in the tail.
    pub low: Option<Price>,
    /// Most recent trade price.
    pub last: Option<Price>,
    /// Volume-weighted average price over the tail.
    pub vwap: Option<f64>,
}

impl MatchingEngine {
    /// The most recent `k` trades across all symbols, oldest first.
    pub fn recent_trades(&self, k: usize) -> Vec<Trade> {
        let trades = lock(self.global_trades());
        let skip = trades.len().saturating_sub(k);
        trades.iter().skip(skip).cloned().collect()
    }

    /// The most recent `k` trades for one symbol, oldest first.
    pub fn recent_trades_for_symbol(&self, symbol: &str, k: usize) -> Vec<Trade> {
        let key = symbol.trim().to_ascii_uppercase();
        self.books()
            .get(&key)
            .map(|book| book.value().recent_trades(k))
            .unwrap_or_default()
    }

    /// The entire retained global trade history, oldest first.
    pub fn all_trades(&self) -> Vec<Trade> {
        lock(self.global_trades()).iter().cloned().collect()
    }

    /// Snapshots of a trader's active orders.
    pub fn trader_orders(&self, trader_id: &str) -> Vec<Order> {
        self.active_order_ids(trader_id)
            .iter()
            .filter_map(|id| self.find_order(id))
            .collect()
    }

    /// Snapshot of one active order by id.
    pub fn find_order(&self, order_id: &OrderId) -> Option<Order> {
        let (symbol, _) = self.locate(order_id)?;
        self.books()
            .get(&symbol)
            .and_then(|book| book.value().get_order(order_id))
    }

    /// Current performance counters.
    pub fn performance_stats(&self) -> PerformanceStats {
        let runtime_seconds = match *lock(&self.started_at) {
            Some(started) => started.elapsed().as_secs_f64(),
            None => 0.0,
        };
        let total_trades = self
            .counters
            .total_trades
            .load(std::sync::atomic::Ordering::Relaxed);
        PerformanceStats {
            total_trades,
            total_volume: self
                .counters
                .total_volume
                .load(std::sync::atomic::Ordering::Relaxed),
            orders_per_second: self.counters.orders_per_second(),
            trades_per_second: if runtime_seconds > 0.0 {
                total_trades as f64 / runtime_seconds
            } else {
                0.0
            },
            avg_latency_ms: self.latency.average(),
            active_orders: self.active_order_count(),
            symbols_active: self.books().len(),
            runtime_seconds,
        }
    }

    /// Per-symbol top-of-book overview across all known symbols.
    pub fn market_summary(&self) -> MarketSummary {
        let mut symbols: Vec<SymbolSummary> = self
            .books()
            .iter()
            .map(|entry| {
                let book = entry.value();
                SymbolSummary {
                    symbol: book.symbol().to_string(),
                    best_bid: book.best_bid_price(),
                    best_ask: book.best_ask_price(),
                    spread: book.spread(),
                    mid_price: book.mid_price(),
                    last_trade_price: book.last_trade_price(),
                    resting_orders: book.resting_orders(),
                }
            })
            .collect();
        symbols.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        MarketSummary {
            timestamp: current_time_millis(),
            symbols,
        }
    }

    /// Trade statistics for one symbol over its retained trade tail, or
    /// `None` for an unknown symbol.
    pub fn symbol_statistics(&self, symbol: &str) -> Option<SymbolStatistics> {
        let key = symbol.trim().to_ascii_uppercase();
        let book = self.books().get(&key)?.value().clone();
        let trades = book.recent_trades(usize::MAX);
        let volume: u64 = trades.iter().map(|t| t.quantity).sum();
        let notional: f64 = trades.iter().map(Trade::notional).sum();
        Some(SymbolStatistics {
            symbol: key,
            trade_count: trades.len(),
            volume,
            high: trades.iter().map(|t| t.price).max(),
            low: trades.iter().map(|t| t.price).min(),
            last: trades.last().map(|t| t.price),
            vwap: if volume > 0 {
                Some(notional / volume as f64)
            } else {
                None
            },
        })
    }
}
