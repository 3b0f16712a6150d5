//! A single price level: a FIFO queue of resting orders at one price.

use crate::types::{Order, OrderError, OrderId, Price, Side};
use crate::utils::lock;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Outcome of filling the front of a level, carrying everything the
/// matcher needs to build the trade and update its indexes.
#[derive(Debug, Clone)]
pub(crate) struct MakerFill {
    /// Id of the resting (maker) order that was hit.
    pub order_id: OrderId,
    /// Owner of the maker order.
    pub trader_id: String,
    /// Execution price: the maker's resting price.
    pub price: Price,
    /// Executed quantity.
    pub quantity: u64,
    /// Maker quantity left after this fill.
    pub maker_remaining: u64,
    /// The maker order was exhausted and removed from the level.
    pub maker_filled: bool,
    /// This fill emptied the level; the level is closed and must be
    /// retired from its side.
    pub level_emptied: bool,
}

struct LevelQueue {
    orders: VecDeque<Order>,
    /// Set when the level empties. A closed level never accepts new
    /// orders, so a concurrently retired level cannot swallow an insert.
    closed: bool,
}

/// All resting orders at a single `(symbol, side, price)`, in strict
/// arrival order, with cached aggregates readable without the queue lock.
pub struct PriceLevel {
    price: Price,
    side: Side,
    queue: Mutex<LevelQueue>,
    total_quantity: AtomicU64,
    order_count: AtomicUsize,
}

impl PriceLevel {
    pub fn new(price: Price, side: Side) -> Self {
        PriceLevel {
            price,
            side,
            queue: Mutex::new(LevelQueue {
                orders: VecDeque::new(),
                closed: false,
            }),
            total_quantity: AtomicU64::new(0),
            order_count: AtomicUsize::new(0),
        }
    }

    /// The price shared by every order at this level.
    pub fn price(&self) -> Price {
        self.price
    }

    /// The side this level belongs to.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Sum of remaining quantities of contained orders.
    pub fn total_quantity(&self) -> u64 {
        self.total_quantity.load(Ordering::Acquire)
    }

    /// Number of resting orders.
    pub fn order_count(&self) -> usize {
        self.order_count.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.order_count() == 0
    }

    /// Append an order to the back of the FIFO.
    ///
    /// Returns the order back if the level has been closed by a concurrent
    /// emptying; the caller must retry against a fresh level.
    pub(crate) fn push(&self, order: Order) -> Result<(), Order> {
        let mut q = lock(&self.queue);
        if q.closed {
            return Err(order);
        }
        self.total_quantity
            .fetch_add(order.remaining_quantity(), Ordering::AcqRel);
        self.order_count.fetch_add(1, Ordering::AcqRel);
        q.orders.push_back(order);
        Ok(())
    }

    /// Fill the front order with up to `max_quantity` at this level's price.
    ///
    /// Returns `Ok(None)` when the level is empty (the level is closed as a
    /// side effect and should be retired). An exhausted maker is popped.
    pub(crate) fn fill_front(&self, max_quantity: u64) -> Result<Option<MakerFill>, OrderError> {
        let mut q = lock(&self.queue);
        let (order_id, trader_id, quantity, maker_remaining) = loop {
            let Some(front) = q.orders.front_mut() else {
                q.closed = true;
                return Ok(None);
            };
            if front.remaining_quantity() == 0 {
                debug_assert!(false, "zero-remaining order resting at {}", self.price);
                tracing::error!(price = %self.price, "dropping zero-remaining resting order");
                q.orders.pop_front();
                self.order_count.fetch_sub(1, Ordering::AcqRel);
                continue;
            }
            let quantity = max_quantity.min(front.remaining_quantity());
            front.fill(quantity, self.price)?;
            break (
                front.id(),
                front.trader_id().to_string(),
                quantity,
                front.remaining_quantity(),
            );
        };
        self.total_quantity.fetch_sub(quantity, Ordering::AcqRel);
        let maker_filled = maker_remaining == 0;
        let mut level_emptied = false;
        if maker_filled {
            q.orders.pop_front();
            self.order_count.fetch_sub(1, Ordering::AcqRel);
            if q.orders.is_empty() {
                q.closed = true;
                level_emptied = true;
            }
        }
        Ok(Some(MakerFill {
            order_id,
            trader_id,
            price: self.price,
            quantity,
            maker_remaining,
            maker_filled,
            level_emptied,
        }))
    }

    /// Remove an order by id, returning it together with a flag telling
    /// whether the removal emptied (and closed) the level.
    pub(crate) fn remove(&self, order_id: &OrderId) -> Option<(Order, bool)> {
        let mut q = lock(&self.queue);
        let pos = q.orders.iter().position(|o| o.id() == *order_id)?;
        let order = q.orders.remove(pos)?;
        self.total_quantity
            .fetch_sub(order.remaining_quantity(), Ordering::AcqRel);
        self.order_count.fetch_sub(1, Ordering::AcqRel);
        let emptied = q.orders.is_empty();
        if emptied {
            q.closed = true;
        }
        Some((order, emptied))
    }

    /// Snapshot of the front order, if any.
    pub fn front(&self) -> Option<Order> {
        lock(&self.queue).orders.front().cloned()
    }

    /// Snapshot of all orders in FIFO order.
    pub fn orders(&self) -> Vec<Order> {
        lock(&self.queue).orders.iter().cloned().collect()
    }

    /// Find an order by id.
    pub fn get(&self, order_id: &OrderId) -> Option<Order> {
        lock(&self.queue)
            .orders
            .iter()
            .find(|o| o.id() == *order_id)
            .cloned()
    }
}
