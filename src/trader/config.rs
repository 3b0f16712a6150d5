//! Trader agent configuration.

use serde::Serialize;

/// Tunables for a synthetic trader agent.
#[derive(Debug, Clone, Serialize)]
pub struct TraderConfig {
    /// Symbols this agent trades; a tick picks one uniformly.
    pub symbols: Vec<String>,
    /// Starting cash balance.
    pub initial_cash: f64,
    /// Smallest order quantity the agent will send.
    pub min_order_size: u64,
    /// Largest order quantity the agent will send.
    pub max_order_size: u64,
    /// Half-width of the uniform price perturbation around the reference.
    pub volatility: f64,
    /// Lower bound of the uniform inter-arrival delay, in milliseconds.
    pub min_interval_ms: u64,
    /// Upper bound of the uniform inter-arrival delay, in milliseconds.
    pub max_interval_ms: u64,
    /// Reference price assigned to a symbol on first use.
    pub initial_reference_price: f64,
    /// Floor below which the random-walk reference never drops.
    pub min_reference_price: f64,
}

impl Default for TraderConfig {
    fn default() -> Self {
        TraderConfig {
            symbols: Vec::new(),
            initial_cash: 100_000.0,
            min_order_size: 10,
            max_order_size: 100,
            volatility: 0.02,
            min_interval_ms: 50,
            max_interval_ms: 500,
            initial_reference_price: 100.0,
            min_reference_price: 1.0,
        }
    }
}

impl TraderConfig {
    /// Default profile trading the given symbols.
    pub fn new<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        TraderConfig {
            symbols: symbols
                .into_iter()
                .map(|s| s.into().trim().to_ascii_uppercase())
                .collect(),
            ..TraderConfig::default()
        }
    }

    /// High-frequency profile: smaller clips, faster ticks.
    pub fn hft<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        TraderConfig {
            min_order_size: 5,
            max_order_size: 50,
            min_interval_ms: 10,
            max_interval_ms: 100,
            ..TraderConfig::new(symbols)
        }
    }
}
