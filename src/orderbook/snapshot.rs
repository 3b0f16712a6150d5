//! Snapshot views of book state for observers and serialization.

use crate::types::Price;
use serde::Serialize;

/// Aggregate view of one price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSnapshot {
    /// The level's price.
    pub price: Price,
    /// Sum of remaining quantities of resting orders.
    pub total_quantity: u64,
    /// Number of resting orders.
    pub order_count: usize,
}

/// Top-of-book depth for both sides, best level first.
#[derive(Debug, Clone, Serialize)]
pub struct BookDepth {
    /// Bid levels, highest price first.
    pub bids: Vec<LevelSnapshot>,
    /// Ask levels, lowest price first.
    pub asks: Vec<LevelSnapshot>,
}

/// A point-in-time copy of a book's visible state.
#[derive(Debug, Clone, Serialize)]
pub struct BookSnapshot {
    /// The book's symbol.
    pub symbol: String,
    /// Epoch milliseconds when the snapshot was taken.
    pub timestamp: u64,
    /// Bid levels, best first.
    pub bids: Vec<LevelSnapshot>,
    /// Ask levels, best first.
    pub asks: Vec<LevelSnapshot>,
    /// Price of the most recent trade, if any.
    pub last_trade_price: Option<Price>,
}
