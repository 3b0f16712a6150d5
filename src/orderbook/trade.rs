//! Trade records emitted by the matcher.

use crate::types::{OrderId, Price};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Width-6 rollover modulus for displayed trade ids.
const TRADE_ID_MODULUS: u64 = 1_000_000;

/// Monotonically increasing trade identifier.
///
/// The raw value increases forever (which keeps trade ordering total); the
/// display form is zero-padded to width 6 and rolls over transparently past
/// 10^6, e.g. `000001`, `000002`, …
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TradeId(u64);

impl TradeId {
    pub(crate) fn from_seq(seq: u64) -> Self {
        TradeId(seq)
    }

    /// The raw monotonic value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0 % TRADE_ID_MODULUS)
    }
}

/// A single execution between one buy and one sell order.
///
/// Buyer and seller are assigned from the orders' BUY/SELL roles,
/// regardless of which side was aggressive.
#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    /// Monotonic identifier, assigned by the engine in emit order.
    pub id: TradeId,
    /// Epoch milliseconds at execution.
    pub timestamp: u64,
    /// Instrument tag.
    pub symbol: String,
    /// Executed quantity, always positive.
    pub quantity: u64,
    /// Execution price: the resting (maker) order's price.
    pub price: Price,
    /// Trader id of the buying side.
    pub buyer_id: String,
    /// Trader id of the selling side.
    pub seller_id: String,
    /// Order id of the buying side.
    pub buy_order_id: OrderId,
    /// Order id of the selling side.
    pub sell_order_id: OrderId,
}

impl Trade {
    /// Notional value of the trade: quantity × price.
    pub fn notional(&self) -> f64 {
        self.quantity as f64 * self.price.to_f64()
    }
}

/// Callback invoked on the matcher thread for every emitted trade.
pub type TradeListener = Arc<dyn Fn(&Trade) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_zero_padded_width_six() {
        assert_eq!(TradeId::from_seq(1).to_string(), "000001");
        assert_eq!(TradeId::from_seq(42).to_string(), "000042");
        assert_eq!(TradeId::from_seq(999_999).to_string(), "999999");
    }

    #[test]
    fn display_rolls_over_past_a_million() {
        assert_eq!(TradeId::from_seq(1_000_001).to_string(), "000001");
        // The raw value still orders trades totally.
        assert!(TradeId::from_seq(1_000_001) > TradeId::from_seq(999_999));
    }

    #[test]
    fn notional_is_quantity_times_price() {
        let trade = Trade {
            id: TradeId::from_seq(1),
            timestamp: 0,
            symbol: "AAPL".to_string(),
            quantity: 10,
            price: Price::from_f64(150.25).unwrap(),
            buyer_id: "B".to_string(),
            seller_id: "S".to_string(),
            buy_order_id: OrderId::nil(),
            sell_order_id: OrderId::nil(),
        };
        assert!((trade.notional() - 1502.5).abs() < 1e-9);
    }
}
