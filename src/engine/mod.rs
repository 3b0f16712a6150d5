//! The matching engine: submission queue, serializer, trade emission,
//! fill dispatch, and observability.

#[allow(clippy::module_inception)]
mod engine;
mod error;
mod fill;
mod queries;
mod stats;

pub use engine::{
    DEFAULT_LATENCY_WINDOW, DEFAULT_TRADE_HISTORY_CAPACITY, EngineConfig, EngineState,
    MatchingEngine,
};
pub use error::EngineError;
pub use fill::{FillEvent, FillHandler};
pub use queries::{MarketSummary, SymbolStatistics, SymbolSummary};
pub use stats::{PerformanceStats, StatsListener};
