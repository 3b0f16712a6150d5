//! One side of an order book: price-ordered levels plus an id locator.

use super::level::{MakerFill, PriceLevel};
use super::snapshot::LevelSnapshot;
use crate::types::{Order, OrderError, OrderId, Price, Side};
use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

/// An ordered collection of price levels for one side of a single symbol.
///
/// Levels live in a `SkipMap` keyed by raw price ticks, so prices stay
/// sorted without explicit re-sorting: the best level is the back of the
/// map for bids (maximum price) and the front for asks (minimum price).
/// A `DashMap` from order id to price lets cancellation locate an order
/// without scanning levels.
pub struct BookSide {
    side: Side,
    levels: SkipMap<u64, Arc<PriceLevel>>,
    locations: DashMap<OrderId, Price>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        BookSide {
            side,
            levels: SkipMap::new(),
            locations: DashMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Append an order to the FIFO of its price level, creating the level
    /// on first use.
    pub(crate) fn add(&self, order: Order) {
        debug_assert_eq!(order.side(), self.side, "order routed to wrong side");
        let price = order.price();
        let id = order.id();
        let mut pending = order;
        loop {
            let entry = self
                .levels
                .get_or_insert_with(price.ticks(), || Arc::new(PriceLevel::new(price, self.side)));
            match entry.value().push(pending) {
                Ok(()) => break,
                Err(returned) => {
                    // The level was emptied and closed concurrently; make
                    // sure the dead entry is gone, then retry.
                    self.retire(price, entry.value());
                    pending = returned;
                }
            }
        }
        self.locations.insert(id, price);
        trace!(side = %self.side, %price, order_id = %id, "order rested");
    }

    /// Remove a resting order by id. Returns the order, untouched except
    /// for the level bookkeeping; the caller owns the status transition.
    pub(crate) fn remove(&self, order_id: &OrderId) -> Option<Order> {
        let (_, price) = self.locations.remove(order_id)?;
        let level = self.levels.get(&price.ticks())?.value().clone();
        let (order, emptied) = level.remove(order_id)?;
        if emptied {
            self.retire(price, &level);
        }
        trace!(side = %self.side, %price, order_id = %order_id, "order removed");
        Some(order)
    }

    /// Fill against the best level, bounded by `max_quantity` and the
    /// taker's `limit` price.
    ///
    /// Returns `Ok(None)` when the side is empty or the best price does not
    /// cross the limit. Empty levels encountered on the way are retired.
    pub(crate) fn fill_best(
        &self,
        max_quantity: u64,
        limit: Price,
        taker: Side,
    ) -> Result<Option<MakerFill>, OrderError> {
        loop {
            let entry = match self.side {
                Side::Buy => self.levels.back(),
                Side::Sell => self.levels.front(),
            };
            let Some(entry) = entry else {
                return Ok(None);
            };
            let level = entry.value().clone();
            drop(entry);
            let price = level.price();
            let crosses = match taker {
                Side::Buy => price <= limit,
                Side::Sell => price >= limit,
            };
            if !crosses {
                return Ok(None);
            }
            match level.fill_front(max_quantity)? {
                Some(fill) => {
                    if fill.maker_filled {
                        self.locations.remove(&fill.order_id);
                    }
                    if fill.level_emptied {
                        self.retire(price, &level);
                    }
                    return Ok(Some(fill));
                }
                // Raced with a cancel that emptied the level; clean up and
                // look at the next one.
                None => self.retire(price, &level),
            }
        }
    }

    /// Remove a level entry, but only if the map still holds this exact
    /// level (a fresh level may have been created at the same price).
    fn retire(&self, price: Price, level: &Arc<PriceLevel>) {
        if let Some(current) = self.levels.get(&price.ticks())
            && Arc::ptr_eq(current.value(), level)
        {
            current.remove();
        }
    }

    /// Best price on this side: maximum for bids, minimum for asks.
    pub fn best_price(&self) -> Option<Price> {
        self.best_level().map(|level| level.price())
    }

    /// Snapshot of the order at the head of the best level's FIFO.
    pub fn best_order(&self) -> Option<Order> {
        loop {
            let level = self.best_level()?;
            match level.front() {
                Some(order) => return Some(order),
                None => self.retire(level.price(), &level),
            }
        }
    }

    fn best_level(&self) -> Option<Arc<PriceLevel>> {
        let entry = match self.side {
            Side::Buy => self.levels.back(),
            Side::Sell => self.levels.front(),
        }?;
        Some(entry.value().clone())
    }

    /// Snapshot of all orders resting at `price`, in FIFO order.
    pub fn orders_at(&self, price: Price) -> Vec<Order> {
        self.levels
            .get(&price.ticks())
            .map(|e| e.value().orders())
            .unwrap_or_default()
    }

    /// Up to `depth` best levels as `(price, total_quantity, order_count)`
    /// views, best first.
    pub fn top_levels(&self, depth: usize) -> Vec<LevelSnapshot> {
        let views = |entry: crossbeam_skiplist::map::Entry<'_, u64, Arc<PriceLevel>>| {
            let level = entry.value();
            LevelSnapshot {
                price: level.price(),
                total_quantity: level.total_quantity(),
                order_count: level.order_count(),
            }
        };
        let collected: Vec<LevelSnapshot> = match self.side {
            Side::Buy => self
                .levels
                .iter()
                .rev()
                .map(views)
                .filter(|v| v.order_count > 0)
                .take(depth)
                .collect(),
            Side::Sell => self
                .levels
                .iter()
                .map(views)
                .filter(|v| v.order_count > 0)
                .take(depth)
                .collect(),
        };
        collected
    }

    /// Total resting quantity at `price`, 0 if the level is absent.
    pub fn volume_at(&self, price: Price) -> u64 {
        self.levels
            .get(&price.ticks())
            .map(|e| e.value().total_quantity())
            .unwrap_or(0)
    }

    /// Snapshot of a resting order by id.
    pub fn get(&self, order_id: &OrderId) -> Option<Order> {
        let price = *self.locations.get(order_id)?;
        self.levels
            .get(&price.ticks())
            .and_then(|e| e.value().get(order_id))
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.locations.contains_key(order_id)
    }

    /// Number of resting orders on this side.
    pub fn order_count(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Drop every level and locator entry.
    pub(crate) fn clear(&self) {
        while self.levels.pop_front().is_some() {}
        self.locations.clear();
    }
}
