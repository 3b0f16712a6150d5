//! The aggressive matching loop for a single incoming order.

use super::book::OrderBook;
use super::error::OrderBookError;
use super::level::MakerFill;
use crate::types::Order;
use tracing::trace;

impl OrderBook {
    /// Match `incoming` against the opposite side until it is exhausted or
    /// prices no longer cross, filling both sides as it goes.
    ///
    /// Each iteration hits the best opposite level and executes at that
    /// level's price (the maker price): price-time priority means the
    /// resting order dictates the price. Within a level the FIFO is
    /// strict, so an earlier arrival always fills first even when it has
    /// already been partially filled. The caller rests any residual.
    ///
    /// The book is never left crossed: the loop only stops when the
    /// opposite best no longer crosses `incoming`'s limit, so any crossing
    /// the incoming order causes is drained before control returns.
    ///
    /// # Errors
    /// Propagates fill-accounting contract violations; the incoming order
    /// and the book retain all fills applied before the failure.
    pub(crate) fn execute(&self, incoming: &mut Order) -> Result<Vec<MakerFill>, OrderBookError> {
        if incoming.symbol() != self.symbol() {
            return Err(OrderBookError::SymbolMismatch {
                book: self.symbol().to_string(),
                order: incoming.symbol().to_string(),
            });
        }
        let opposite = self.side(incoming.side().opposite());
        let mut fills = Vec::new();
        while incoming.remaining_quantity() > 0 {
            let Some(maker) = opposite.fill_best(
                incoming.remaining_quantity(),
                incoming.price(),
                incoming.side(),
            )?
            else {
                break;
            };
            incoming.fill(maker.quantity, maker.price)?;
            self.record_trade_price(maker.price);
            trace!(
                symbol = %self.symbol(),
                taker = %incoming.id(),
                maker = %maker.order_id,
                quantity = maker.quantity,
                price = %maker.price,
                "executed"
            );
            fills.push(maker);
        }
        Ok(fills)
    }
}
