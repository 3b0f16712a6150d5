//! Property-based tests for system-wide invariants.
//!
//! Random order streams are pushed through the engine and the universal
//! invariants are checked at quiescence: conservation of quantity, no
//! crossed book, consistent level bookkeeping, monotone trade ids, and
//! cancel safety.

use matchbook_rs::prelude::*;
use proptest::prelude::*;
use std::sync::Arc;

/// Narrow price band so random streams actually cross.
fn price_strategy() -> impl Strategy<Value = Price> {
    (995_000u64..=1_005_000u64).prop_map(|ticks| Price::from_ticks(ticks).unwrap())
}

fn quantity_strategy() -> impl Strategy<Value = u64> {
    1u64..=100u64
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Buy), Just(Side::Sell)]
}

fn order_stream() -> impl Strategy<Value = Vec<(Side, Price, u64)>> {
    prop::collection::vec((side_strategy(), price_strategy(), quantity_strategy()), 1..60)
}

fn run_stream(orders: &[(Side, Price, u64)]) -> Arc<MatchingEngine> {
    let engine = Arc::new(MatchingEngine::new());
    for (index, (side, price, quantity)) in orders.iter().enumerate() {
        let trader = format!("T{}", index % 5);
        let order = Order::new(trader, "TEST", *side, *quantity, *price).unwrap();
        engine.submit(order).unwrap();
    }
    engine.process_pending();
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Book never crossed at quiescence.
    #[test]
    fn no_crossed_quiescence(orders in order_stream()) {
        let engine = run_stream(&orders);
        let book = engine.get_order_book("TEST");
        if let (Some(bid), Some(ask)) = (book.best_bid_price(), book.best_ask_price()) {
            prop_assert!(bid < ask, "crossed book: bid {bid} >= ask {ask}");
        }
        prop_assert!(!book.is_crossed());
    }

    /// Quantity is conserved across the whole system: everything submitted
    /// is either resting or was consumed by a trade (once per side).
    #[test]
    fn global_quantity_conservation(orders in order_stream()) {
        let engine = run_stream(&orders);
        let book = engine.get_order_book("TEST");
        let submitted: u64 = orders.iter().map(|(_, _, quantity)| quantity).sum();
        let (bid_resting, ask_resting) = book.depth_totals();
        let traded: u64 = engine.all_trades().iter().map(|t| t.quantity).sum();
        prop_assert_eq!(submitted, bid_resting + ask_resting + 2 * traded);
    }

    /// Per-order conservation for everything still queryable.
    #[test]
    fn resting_order_conservation(orders in order_stream()) {
        let engine = run_stream(&orders);
        for trader in 0..5 {
            for order in engine.trader_orders(&format!("T{trader}")) {
                prop_assert_eq!(
                    order.filled_quantity() + order.remaining_quantity(),
                    order.original_quantity()
                );
                let from_fills: u64 = order.fills().iter().map(|f| f.quantity).sum();
                prop_assert_eq!(order.filled_quantity(), from_fills);
            }
        }
    }

    /// Level aggregates match their contents and empty levels are absent.
    #[test]
    fn level_bookkeeping(orders in order_stream()) {
        let engine = run_stream(&orders);
        let book = engine.get_order_book("TEST");
        for side in [Side::Buy, Side::Sell] {
            for level in book.side(side).top_levels(usize::MAX) {
                prop_assert!(level.order_count > 0, "empty level retained at {}", level.price);
                let resting = book.side(side).orders_at(level.price);
                prop_assert_eq!(level.order_count, resting.len());
                let quantity: u64 = resting.iter().map(|o| o.remaining_quantity()).sum();
                prop_assert_eq!(level.total_quantity, quantity);
            }
        }
    }

    /// Trade ids strictly increase in emit order.
    #[test]
    fn monotone_trade_ids(orders in order_stream()) {
        let engine = run_stream(&orders);
        let trades = engine.all_trades();
        for pair in trades.windows(2) {
            prop_assert!(pair[0].id < pair[1].id);
        }
    }

    /// Trades execute at a price both parties accept: at or below the
    /// buyer's limit and at or above the seller's limit never fails by
    /// construction, so check the observable half: every trade price lies
    /// inside the submitted price band.
    #[test]
    fn trade_prices_within_band(orders in order_stream()) {
        let engine = run_stream(&orders);
        let min = Price::from_ticks(995_000).unwrap();
        let max = Price::from_ticks(1_005_000).unwrap();
        for trade in engine.all_trades() {
            prop_assert!(trade.price >= min && trade.price <= max);
        }
    }

    /// A cancelled order contributes zero further fills.
    #[test]
    fn cancel_safety(
        orders in order_stream(),
        chasers in prop::collection::vec((side_strategy(), quantity_strategy()), 1..20),
    ) {
        let engine = run_stream(&orders);

        // Cancel every resting order belonging to T0.
        let cancelled: Vec<OrderId> = engine
            .trader_orders("T0")
            .iter()
            .map(|o| o.id())
            .collect();
        for id in &cancelled {
            prop_assert!(engine.cancel(id));
        }
        let trades_before = engine.all_trades().len();

        // Aggressive follow-up flow that would have hit those orders.
        for (side, quantity) in chasers {
            let price = match side {
                Side::Buy => Price::from_ticks(1_005_000).unwrap(),
                Side::Sell => Price::from_ticks(995_000).unwrap(),
            };
            let order = Order::new("CHASER", "TEST", side, quantity, price).unwrap();
            engine.submit(order).unwrap();
        }
        engine.process_pending();

        for trade in engine.all_trades().iter().skip(trades_before) {
            for id in &cancelled {
                prop_assert!(trade.buy_order_id != *id && trade.sell_order_id != *id);
            }
        }
    }
}
