//! Core order book: two sides plus a bounded trade tail for one symbol.

use super::error::OrderBookError;
use super::side::BookSide;
use super::snapshot::{BookDepth, BookSnapshot, LevelSnapshot};
use super::trade::Trade;
use crate::types::{Order, OrderId, Price, Side};
use crate::utils::{current_time_millis, lock};
use crossbeam::atomic::AtomicCell;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

/// Default capacity of the per-book trade ring.
pub const DEFAULT_BOOK_TRADE_CAPACITY: usize = 1000;

/// The central limit order book for one symbol.
///
/// The matcher is the sole mutator of resting state; observers read
/// snapshots. External queries never see a half-mutated level: level
/// mutation happens under the per-level queue lock and queries copy out
/// under the same lock.
pub struct OrderBook {
    /// Uppercase symbol this book trades.
    symbol: String,
    /// Buy side; best price is the maximum.
    bids: BookSide,
    /// Sell side; best price is the minimum.
    asks: BookSide,
    /// Bounded tail of recent trades, oldest evicted first.
    trades: Mutex<VecDeque<Trade>>,
    trade_capacity: usize,
    /// Ticks of the most recent trade price, 0 before any trade.
    last_trade_price: AtomicCell<u64>,
    has_traded: AtomicBool,
}

impl OrderBook {
    /// Create an empty book with the default trade-ring capacity.
    pub fn new(symbol: &str) -> Self {
        Self::with_trade_capacity(symbol, DEFAULT_BOOK_TRADE_CAPACITY)
    }

    /// Create an empty book retaining up to `capacity` recent trades.
    pub fn with_trade_capacity(symbol: &str, capacity: usize) -> Self {
        OrderBook {
            symbol: symbol.trim().to_ascii_uppercase(),
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            trades: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            trade_capacity: capacity,
            last_trade_price: AtomicCell::new(0),
            has_traded: AtomicBool::new(false),
        }
    }

    /// The symbol this book trades.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The side container for `side`.
    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Rest an order on its side of the book.
    ///
    /// # Errors
    /// [`OrderBookError::SymbolMismatch`] when the order belongs to a
    /// different symbol; the book is left unchanged.
    pub fn add(&self, order: Order) -> Result<(), OrderBookError> {
        if order.symbol() != self.symbol {
            return Err(OrderBookError::SymbolMismatch {
                book: self.symbol.clone(),
                order: order.symbol().to_string(),
            });
        }
        trace!(symbol = %self.symbol, order_id = %order.id(), side = %order.side(), price = %order.price(), "resting order");
        self.side(order.side()).add(order);
        Ok(())
    }

    /// Remove a resting order from the given side. Returns the order with
    /// its level bookkeeping already unwound, or `None` if it is not
    /// resting there.
    pub fn remove(&self, order_id: &OrderId, side: Side) -> Option<Order> {
        self.side(side).remove(order_id)
    }

    /// Snapshot of a resting order by id, searching both sides.
    pub fn get_order(&self, order_id: &OrderId) -> Option<Order> {
        self.bids.get(order_id).or_else(|| self.asks.get(order_id))
    }

    /// Snapshot of the best (highest) bid order.
    pub fn best_bid(&self) -> Option<Order> {
        self.bids.best_order()
    }

    /// Snapshot of the best (lowest) ask order.
    pub fn best_ask(&self) -> Option<Order> {
        self.asks.best_order()
    }

    /// Highest bid price, if any bid is resting.
    pub fn best_bid_price(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Lowest ask price, if any ask is resting.
    pub fn best_ask_price(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// `best_ask − best_bid`, `None` when either side is empty.
    pub fn spread(&self) -> Option<f64> {
        let bid = self.best_bid_price()?;
        let ask = self.best_ask_price()?;
        Some(ask.to_f64() - bid.to_f64())
    }

    /// `(best_bid + best_ask) / 2`, `None` when either side is empty.
    pub fn mid_price(&self) -> Option<f64> {
        let bid = self.best_bid_price()?;
        let ask = self.best_ask_price()?;
        Some((bid.to_f64() + ask.to_f64()) / 2.0)
    }

    /// Up to `depth` best levels on both sides.
    pub fn top_levels(&self, depth: usize) -> BookDepth {
        BookDepth {
            bids: self.bids.top_levels(depth),
            asks: self.asks.top_levels(depth),
        }
    }

    /// Total resting quantity at `price` on `side`.
    pub fn volume_at(&self, price: Price, side: Side) -> u64 {
        self.side(side).volume_at(price)
    }

    /// `true` when `best_bid ≥ best_ask` with both present. Outside the
    /// matcher's critical section a quiescent book is never crossed.
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid_price(), self.best_ask_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    /// Number of orders resting on both sides.
    pub fn resting_orders(&self) -> usize {
        self.bids.order_count() + self.asks.order_count()
    }

    /// Append a trade to the bounded ring, evicting the oldest when full.
    pub fn append_trade(&self, trade: Trade) {
        let mut trades = lock(&self.trades);
        if trades.len() == self.trade_capacity {
            trades.pop_front();
        }
        trades.push_back(trade);
    }

    /// The most recent `k` trades, oldest first.
    pub fn recent_trades(&self, k: usize) -> Vec<Trade> {
        let trades = lock(&self.trades);
        let skip = trades.len().saturating_sub(k);
        trades.iter().skip(skip).cloned().collect()
    }

    /// Number of trades currently retained in the ring.
    pub fn retained_trade_count(&self) -> usize {
        lock(&self.trades).len()
    }

    /// Price of the most recent trade in this book, if any.
    pub fn last_trade_price(&self) -> Option<Price> {
        if !self.has_traded.load(Ordering::Acquire) {
            return None;
        }
        Price::from_ticks(self.last_trade_price.load()).ok()
    }

    pub(crate) fn record_trade_price(&self, price: Price) {
        self.last_trade_price.store(price.ticks());
        self.has_traded.store(true, Ordering::Release);
    }

    /// Drop all resting orders and retained trades.
    pub fn clear(&self) {
        self.bids.clear();
        self.asks.clear();
        lock(&self.trades).clear();
        self.last_trade_price.store(0);
        self.has_traded.store(false, Ordering::Release);
    }

    /// Point-in-time copy of the book's visible state down to `depth`
    /// levels per side.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        let BookDepth { bids, asks } = self.top_levels(depth);
        BookSnapshot {
            symbol: self.symbol.clone(),
            timestamp: current_time_millis(),
            bids,
            asks,
            last_trade_price: self.last_trade_price(),
        }
    }

    /// Serialize a depth-limited snapshot as JSON.
    pub fn to_json(&self, depth: usize) -> Result<String, OrderBookError> {
        serde_json::to_string(&self.snapshot(depth)).map_err(|e| OrderBookError::Serialization {
            message: e.to_string(),
        })
    }

    /// Cumulative resting volume per side, mostly useful in tests and
    /// invariant checks.
    pub fn depth_totals(&self) -> (u64, u64) {
        let totals = |levels: Vec<LevelSnapshot>| levels.iter().map(|l| l.total_quantity).sum();
        let BookDepth { bids, asks } = self.top_levels(usize::MAX);
        (totals(bids), totals(asks))
    }
}
