//! The order lifecycle state machine and fill accounting.

use super::error::OrderError;
use super::id::OrderId;
use super::price::Price;
use super::side::Side;
use crate::utils::current_time_millis;
use serde::Serialize;
use std::fmt;

/// Lifecycle status of an order.
///
/// Transitions: `Pending → PartiallyFilled → Filled`, or any active state
/// `→ Cancelled`. `Filled` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    /// Accepted, no fills yet.
    Pending,
    /// At least one fill, remaining quantity positive.
    PartiallyFilled,
    /// Remaining quantity reached zero.
    Filled,
    /// Cancelled before completion.
    Cancelled,
}

impl OrderStatus {
    /// `true` for `Pending` and `PartiallyFilled`.
    pub fn is_active(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::PartiallyFilled)
    }

    /// `true` for `Filled` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// A single execution against an order. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fill {
    /// Executed quantity, always positive.
    pub quantity: u64,
    /// Execution price (the maker price).
    pub price: Price,
    /// Epoch milliseconds at execution.
    pub time: u64,
}

/// A limit order.
///
/// Immutable except for fill accounting and status. Constructed by a
/// submitter; after submission the matcher holds the authoritative copy and
/// is the only mutator. Clones handed out by queries are snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    id: OrderId,
    trader_id: String,
    symbol: String,
    side: Side,
    original_quantity: u64,
    remaining_quantity: u64,
    price: Price,
    status: OrderStatus,
    submit_time: u64,
    fills: Vec<Fill>,
}

impl Order {
    /// Create a new order, validating quantity and identifier fields.
    ///
    /// The symbol is uppercased; submit time is assigned here and serves as
    /// the tie-breaker for time priority.
    ///
    /// # Errors
    /// [`OrderError::InvalidQuantity`] on a zero quantity,
    /// [`OrderError::EmptyField`] on a blank trader id or symbol.
    pub fn new(
        trader_id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        quantity: u64,
        price: Price,
    ) -> Result<Self, OrderError> {
        let trader_id = trader_id.into();
        let symbol = symbol.into();
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity });
        }
        if trader_id.trim().is_empty() {
            return Err(OrderError::EmptyField { field: "trader_id" });
        }
        if symbol.trim().is_empty() {
            return Err(OrderError::EmptyField { field: "symbol" });
        }
        Ok(Order {
            id: OrderId::new(),
            trader_id,
            symbol: symbol.trim().to_ascii_uppercase(),
            side,
            original_quantity: quantity,
            remaining_quantity: quantity,
            price,
            status: OrderStatus::Pending,
            submit_time: current_time_millis(),
            fills: Vec::new(),
        })
    }

    /// Unique identifier.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Identifier of the submitter.
    pub fn trader_id(&self) -> &str {
        &self.trader_id
    }

    /// Uppercase instrument tag.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Buy or sell.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Quantity at construction. Never changes.
    pub fn original_quantity(&self) -> u64 {
        self.original_quantity
    }

    /// Unfilled quantity. Monotonically non-increasing.
    pub fn remaining_quantity(&self) -> u64 {
        self.remaining_quantity
    }

    /// Limit price, fixed at construction.
    pub fn price(&self) -> Price {
        self.price
    }

    /// Current lifecycle status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Epoch milliseconds at construction; the time-priority tie-breaker.
    pub fn submit_time(&self) -> u64 {
        self.submit_time
    }

    /// Executions recorded against this order, in execution order.
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Total executed quantity.
    pub fn filled_quantity(&self) -> u64 {
        self.fills.iter().map(|f| f.quantity).sum()
    }

    /// Volume-weighted average execution price, `0.0` with no fills.
    pub fn average_fill_price(&self) -> f64 {
        let filled = self.filled_quantity();
        if filled == 0 {
            return 0.0;
        }
        let notional: f64 = self
            .fills
            .iter()
            .map(|f| f.quantity as f64 * f.price.to_f64())
            .sum();
        notional / filled as f64
    }

    /// `true` while the order can still trade or be cancelled.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Record an execution of `quantity` at `price`.
    ///
    /// Precondition: `quantity` is positive and does not exceed the
    /// remaining quantity. On violation the order is left untouched.
    pub(crate) fn fill(&mut self, quantity: u64, price: Price) -> Result<(), OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity });
        }
        if quantity > self.remaining_quantity {
            return Err(OrderError::Overfill {
                requested: quantity,
                remaining: self.remaining_quantity,
            });
        }
        debug_assert!(self.is_active(), "fill on terminal order {}", self.id);
        self.fills.push(Fill {
            quantity,
            price,
            time: current_time_millis(),
        });
        self.remaining_quantity -= quantity;
        self.status = if self.remaining_quantity == 0 {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        Ok(())
    }

    /// Transition to `Cancelled` from an active state.
    ///
    /// Returns whether the transition happened. Idempotent on terminal
    /// states.
    pub(crate) fn cancel(&mut self) -> bool {
        if self.is_active() {
            self.status = OrderStatus::Cancelled;
            true
        } else {
            false
        }
    }
}
