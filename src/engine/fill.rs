//! Fill notifications delivered to traders.

use crate::types::{OrderId, Price, Side};
use serde::Serialize;

/// Notification of one execution against one party's order.
///
/// Each trade produces two of these, dispatched buyer first, then seller,
/// both before any later trade's notifications.
#[derive(Debug, Clone, Serialize)]
pub struct FillEvent {
    /// The filled order.
    pub order_id: OrderId,
    /// Owner of the filled order.
    pub trader_id: String,
    /// Instrument tag.
    pub symbol: String,
    /// Side of the filled order, from the order's own role.
    pub side: Side,
    /// Executed quantity.
    pub quantity: u64,
    /// Execution price (maker price).
    pub price: Price,
    /// Epoch milliseconds of the trade.
    pub timestamp: u64,
}

/// Receiver of fill notifications, registered with the engine by trader id.
///
/// `on_fill` runs on the matcher thread and must not block. Reacting with
/// new orders is fine as long as they go through `submit` (which only
/// enqueues) rather than any path that waits for matching.
pub trait FillHandler: Send + Sync {
    /// The trader id this handler receives fills for.
    fn trader_id(&self) -> &str;

    /// Called once per trade per side owned by this trader. Self-trades
    /// call this twice, once per side.
    fn on_fill(&self, fill: &FillEvent);
}
