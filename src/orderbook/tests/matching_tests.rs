//! Tests for the aggressive matching loop.

use crate::orderbook::OrderBook;
use crate::types::{Order, OrderStatus, Price, Side};

fn price(p: f64) -> Price {
    Price::from_f64(p).unwrap()
}

fn order(trader: &str, side: Side, quantity: u64, p: f64) -> Order {
    Order::new(trader, "TEST", side, quantity, price(p)).unwrap()
}

#[test]
fn equal_prices_cross_at_maker_price() {
    let book = OrderBook::new("TEST");
    book.add(order("T1", Side::Sell, 10, 150.0)).unwrap();

    let mut incoming = order("T2", Side::Buy, 10, 150.0);
    let fills = book.execute(&mut incoming).unwrap();

    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].quantity, 10);
    assert_eq!(fills[0].price, price(150.0));
    assert!(fills[0].maker_filled);
    assert_eq!(incoming.status(), OrderStatus::Filled);
    assert_eq!(book.resting_orders(), 0);
    assert_eq!(book.last_trade_price(), Some(price(150.0)));
}

#[test]
fn taker_pays_maker_price_not_its_own() {
    let book = OrderBook::new("TEST");
    book.add(order("T1", Side::Sell, 10, 100.0)).unwrap();

    // Buyer is willing to pay 105 but executes at the resting 100.
    let mut incoming = order("T2", Side::Buy, 10, 105.0);
    let fills = book.execute(&mut incoming).unwrap();
    assert_eq!(fills[0].price, price(100.0));
    assert_eq!(incoming.fills()[0].price, price(100.0));
}

#[test]
fn walks_levels_in_price_order_and_stops_at_limit() {
    let book = OrderBook::new("TEST");
    book.add(order("T1", Side::Sell, 5, 101.0)).unwrap();
    book.add(order("T2", Side::Sell, 5, 102.0)).unwrap();
    book.add(order("T3", Side::Sell, 5, 103.0)).unwrap();

    let mut incoming = order("T4", Side::Buy, 12, 102.5);
    let fills = book.execute(&mut incoming).unwrap();

    assert_eq!(fills.len(), 2);
    assert_eq!(fills[0].price, price(101.0));
    assert_eq!(fills[0].quantity, 5);
    assert_eq!(fills[1].price, price(102.0));
    assert_eq!(fills[1].quantity, 5);

    // 2 left, unmatchable at 102.5 against a 103 ask.
    assert_eq!(incoming.remaining_quantity(), 2);
    assert_eq!(incoming.status(), OrderStatus::PartiallyFilled);
    assert_eq!(book.best_ask_price(), Some(price(103.0)));
    assert_eq!(book.volume_at(price(103.0), Side::Sell), 5);
}

#[test]
fn fifo_within_a_level() {
    let book = OrderBook::new("TEST");
    let first = order("T1", Side::Buy, 10, 100.0);
    let second = order("T2", Side::Buy, 10, 100.0);
    book.add(first).unwrap();
    book.add(second).unwrap();

    let mut incoming = order("T3", Side::Sell, 15, 100.0);
    let fills = book.execute(&mut incoming).unwrap();

    assert_eq!(fills.len(), 2);
    assert_eq!(fills[0].trader_id, "T1");
    assert_eq!(fills[0].quantity, 10);
    assert_eq!(fills[1].trader_id, "T2");
    assert_eq!(fills[1].quantity, 5);
    assert_eq!(incoming.status(), OrderStatus::Filled);
    assert_eq!(book.volume_at(price(100.0), Side::Buy), 5);
}

#[test]
fn no_cross_leaves_book_unchanged() {
    let book = OrderBook::new("TEST");
    book.add(order("T1", Side::Buy, 10, 99.0)).unwrap();

    let mut incoming = order("T2", Side::Sell, 10, 100.0);
    let fills = book.execute(&mut incoming).unwrap();

    assert!(fills.is_empty());
    assert_eq!(incoming.status(), OrderStatus::Pending);
    assert_eq!(incoming.remaining_quantity(), 10);
    assert_eq!(book.volume_at(price(99.0), Side::Buy), 10);
}

#[test]
fn never_leaves_book_crossed() {
    let book = OrderBook::new("TEST");
    book.add(order("T1", Side::Sell, 5, 100.0)).unwrap();
    book.add(order("T2", Side::Sell, 5, 101.0)).unwrap();

    // A large crossing buy sweeps both levels, then rests.
    let mut incoming = order("T3", Side::Buy, 20, 101.0);
    book.execute(&mut incoming).unwrap();
    if incoming.is_active() && incoming.remaining_quantity() > 0 {
        book.add(incoming).unwrap();
    }
    assert!(!book.is_crossed());
    assert_eq!(book.best_bid_price(), Some(price(101.0)));
    assert_eq!(book.best_ask_price(), None);
}

#[test]
fn level_aggregates_stay_consistent_after_matching() {
    let book = OrderBook::new("TEST");
    for quantity in [3u64, 7, 11] {
        book.add(order("T1", Side::Sell, quantity, 100.0)).unwrap();
    }
    let mut incoming = order("T2", Side::Buy, 5, 100.0);
    book.execute(&mut incoming).unwrap();

    let resting = book.side(Side::Sell).orders_at(price(100.0));
    let expected: u64 = resting.iter().map(|o| o.remaining_quantity()).sum();
    assert_eq!(book.volume_at(price(100.0), Side::Sell), expected);
    assert_eq!(expected, 16);
    assert_eq!(resting.len(), 2);
}
