//! Synthetic trader agents that generate order flow against the engine.

mod config;
#[allow(clippy::module_inception)]
mod trader;

pub use config::TraderConfig;
pub use trader::{Trader, TraderPerformance};
