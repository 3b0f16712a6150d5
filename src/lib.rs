//! # Multi-Symbol Limit-Order Matching Simulator
//!
//! An in-process matching engine and market simulator written in Rust. The
//! crate maintains one central limit order book per trading symbol, matches
//! incoming orders against resting liquidity under strict price-time
//! priority, and emits a totally ordered stream of trades and fills. On top
//! of the matching substrate it drives synthetic trader agents that
//! generate order flow against the engine, and a CSV port that ingests
//! order batches and exports trades, book snapshots, and performance
//! reports in a stable tabular form.
//!
//! ## Key Features
//!
//! - **Price-time priority matching**: trades always execute at the resting
//!   (maker) price; within a price level the FIFO is strict, so an earlier
//!   arrival fills first even after partial fills.
//!
//! - **Concurrent book structure**: price levels live in lock-free ordered
//!   skip maps with per-level FIFO queues, and id-to-location indexes make
//!   cancellation cheap. Observer queries copy snapshots under short
//!   guards and never see a half-mutated book.
//!
//! - **A single logical serializer**: many producer threads (trader agents,
//!   CSV ingest) feed one submission queue; a dedicated matcher thread
//!   drains it, which is what makes the ordering guarantees hold — global
//!   matching order is dequeue order, trade ids increase monotonically,
//!   and fill callbacks for a trade fire buyer first, then seller, before
//!   any later trade's callbacks.
//!
//! - **Synthetic agents**: each trader owns its timer, walks a private
//!   reference price, biases its side by inventory, clamps orders to its
//!   cash and holdings, and keeps cash / position / cost-basis accounting
//!   consistent off asynchronous fill notifications.
//!
//! - **Bounded observability**: per-book trade rings, a global trade
//!   history, and rolling performance counters (orders/s, mean matching
//!   latency, trades/s) published on a one-second tick — all ring-bounded
//!   with oldest-wins eviction.
//!
//! ## Example
//!
//! ```
//! use matchbook_rs::prelude::*;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(MatchingEngine::new());
//!
//! let sell = Order::new("maker", "AAPL", Side::Sell, 10, Price::from_f64(150.0)?)?;
//! let buy = Order::new("taker", "AAPL", Side::Buy, 10, Price::from_f64(150.0)?)?;
//! engine.submit(sell)?;
//! engine.submit(buy)?;
//!
//! // Deterministic draining; `engine.start()` spawns the threaded worker
//! // instead.
//! engine.process_pending();
//!
//! let trades = engine.recent_trades(10);
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].quantity, 10);
//! assert_eq!(trades[0].buyer_id, "taker");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Design Notes
//!
//! The matcher is the sole mutator of any given book; cancellation from
//! other threads serializes with it on the per-level queue lock, which is
//! how cancel/match races resolve. Traders hold an owning handle to the
//! engine while the engine holds only weak handles back, so no reference
//! cycle forms and dropping a trader unregisters it.
//!
//! Orders are plain limit orders. There is no market-order type, no
//! time-in-force, no persistence, and no network surface; the simulator is
//! a substrate for stress-testing book and matching behavior, not a venue.

pub mod csvio;
pub mod engine;
pub mod orderbook;
pub mod trader;
pub mod types;

pub mod prelude;
mod utils;

pub use csvio::{CsvError, ImportReport};
pub use engine::{
    EngineConfig, EngineError, EngineState, FillEvent, FillHandler, MarketSummary, MatchingEngine,
    PerformanceStats, StatsListener, SymbolStatistics, SymbolSummary,
};
pub use orderbook::{
    BookDepth, BookSnapshot, LevelSnapshot, OrderBook, OrderBookError, Trade, TradeId,
    TradeListener,
};
pub use trader::{Trader, TraderConfig, TraderPerformance};
pub use types::{Fill, Order, OrderError, OrderId, OrderStatus, PRICE_SCALE, Price, Side};
pub use utils::current_time_millis;
