//! Tests for book-level queries and bookkeeping.

use crate::orderbook::OrderBook;
use crate::types::{Order, Price, Side};

fn price(p: f64) -> Price {
    Price::from_f64(p).unwrap()
}

fn order(trader: &str, side: Side, quantity: u64, p: f64) -> Order {
    Order::new(trader, "TEST", side, quantity, price(p)).unwrap()
}

#[test]
fn rejects_wrong_symbol() {
    let book = OrderBook::new("AAPL");
    let o = Order::new("T1", "MSFT", Side::Buy, 10, price(100.0)).unwrap();
    assert!(book.add(o).is_err());
    assert_eq!(book.resting_orders(), 0);
}

#[test]
fn best_prices_and_spread() {
    let book = OrderBook::new("TEST");
    assert_eq!(book.spread(), None);
    assert_eq!(book.mid_price(), None);

    book.add(order("T1", Side::Buy, 10, 99.0)).unwrap();
    book.add(order("T2", Side::Sell, 10, 100.0)).unwrap();

    assert_eq!(book.best_bid_price(), Some(price(99.0)));
    assert_eq!(book.best_ask_price(), Some(price(100.0)));
    assert!((book.spread().unwrap() - 1.0).abs() < 1e-9);
    assert!((book.mid_price().unwrap() - 99.5).abs() < 1e-9);
    assert!(!book.is_crossed());

    let best_bid = book.best_bid().unwrap();
    assert_eq!(best_bid.trader_id(), "T1");
    assert_eq!(best_bid.price(), price(99.0));
    let best_ask = book.best_ask().unwrap();
    assert_eq!(best_ask.trader_id(), "T2");
}

#[test]
fn top_levels_reports_both_sides() {
    let book = OrderBook::new("TEST");
    book.add(order("T1", Side::Buy, 10, 99.0)).unwrap();
    book.add(order("T2", Side::Buy, 5, 98.0)).unwrap();
    book.add(order("T3", Side::Sell, 7, 101.0)).unwrap();

    let depth = book.top_levels(5);
    assert_eq!(depth.bids.len(), 2);
    assert_eq!(depth.bids[0].price, price(99.0));
    assert_eq!(depth.asks.len(), 1);
    assert_eq!(depth.asks[0].total_quantity, 7);
}

#[test]
fn volume_at_aggregates_level() {
    let book = OrderBook::new("TEST");
    book.add(order("T1", Side::Buy, 10, 99.0)).unwrap();
    book.add(order("T2", Side::Buy, 15, 99.0)).unwrap();
    assert_eq!(book.volume_at(price(99.0), Side::Buy), 25);
    assert_eq!(book.volume_at(price(99.0), Side::Sell), 0);
}

#[test]
fn remove_clears_empty_level() {
    let book = OrderBook::new("TEST");
    let o = order("T1", Side::Buy, 10, 99.0);
    let id = o.id();
    book.add(o).unwrap();

    let removed = book.remove(&id, Side::Buy).unwrap();
    assert_eq!(removed.id(), id);
    assert_eq!(book.best_bid_price(), None);
    assert_eq!(book.top_levels(5).bids.len(), 0);
}

#[test]
fn trade_ring_evicts_oldest() {
    use crate::orderbook::{Trade, TradeId};
    use crate::types::OrderId;

    let book = OrderBook::with_trade_capacity("TEST", 3);
    for seq in 1..=5u64 {
        book.append_trade(Trade {
            id: TradeId::from_seq(seq),
            timestamp: seq,
            symbol: "TEST".to_string(),
            quantity: 1,
            price: price(100.0),
            buyer_id: "B".to_string(),
            seller_id: "S".to_string(),
            buy_order_id: OrderId::nil(),
            sell_order_id: OrderId::nil(),
        });
    }
    let recent = book.recent_trades(10);
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].id, TradeId::from_seq(3));
    assert_eq!(recent[2].id, TradeId::from_seq(5));

    let tail = book.recent_trades(2);
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].id, TradeId::from_seq(4));
}

#[test]
fn snapshot_serializes_to_json() {
    let book = OrderBook::new("TEST");
    book.add(order("T1", Side::Buy, 10, 99.0)).unwrap();
    let json = book.to_json(5).unwrap();
    assert!(json.contains("\"symbol\":\"TEST\""));
    assert!(json.contains("\"bids\""));
}

#[test]
fn clear_resets_everything() {
    let book = OrderBook::new("TEST");
    book.add(order("T1", Side::Buy, 10, 99.0)).unwrap();
    book.add(order("T2", Side::Sell, 10, 101.0)).unwrap();
    book.clear();
    assert_eq!(book.resting_orders(), 0);
    assert_eq!(book.best_bid_price(), None);
    assert_eq!(book.best_ask_price(), None);
    assert_eq!(book.last_trade_price(), None);
    assert!(book.recent_trades(10).is_empty());
}
