//! Prelude module that re-exports commonly used types and traits.
//!
//! Instead of importing each type individually, you can use:
//!
//! ```rust
//! use matchbook_rs::prelude::*;
//! ```

// Core domain types
pub use crate::types::{Fill, Order, OrderError, OrderId, OrderStatus, Price, Side};

// Order book types
pub use crate::orderbook::{BookDepth, BookSnapshot, LevelSnapshot, OrderBook, OrderBookError};

// Trade types
pub use crate::orderbook::{Trade, TradeId, TradeListener};

// Engine types
pub use crate::engine::{
    EngineConfig, EngineError, EngineState, FillEvent, FillHandler, MatchingEngine,
    PerformanceStats,
};

// Trader agent types
pub use crate::trader::{Trader, TraderConfig, TraderPerformance};

// CSV port
pub use crate::csvio::{
    CsvError, ImportReport, RowError, export_engine_metrics, export_engine_metrics_to_path,
    export_order_book, export_order_book_to_path, export_trader_performance,
    export_trader_performance_to_path, export_trades, export_trades_to_path, import_orders,
    import_orders_from_path,
};

// Utility functions
pub use crate::utils::current_time_millis;
