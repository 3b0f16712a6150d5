//! Synthetic trader agent: generates order flow and tracks its own book
//! of cash, positions, and cost basis off fill notifications.

use super::config::TraderConfig;
use crate::engine::{FillEvent, FillHandler, MatchingEngine};
use crate::types::{Order, Price, Side};
use crate::utils::lock;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Position threshold above which the agent leans toward selling.
const LONG_BIAS_THRESHOLD: i64 = 500;

/// Mutable trader accounting, guarded as one unit so fill handling and
/// reads are consistent.
struct TraderState {
    cash: f64,
    positions: HashMap<String, i64>,
    average_cost: HashMap<String, f64>,
    /// Private random-walk price estimate per symbol. Deliberately
    /// independent of the real book, matching the simulated agents'
    /// behavior; valuation uses these estimates, not executed prices.
    reference_prices: HashMap<String, f64>,
    orders_sent: u64,
    orders_filled: u64,
    total_volume: u64,
}

/// One row of trader performance reporting.
#[derive(Debug, Clone, Serialize)]
pub struct TraderPerformance {
    /// Trader id.
    pub trader_id: String,
    /// Cash at construction.
    pub initial_cash: f64,
    /// Current cash balance.
    pub cash: f64,
    /// Cash plus positions valued at the reference prices.
    pub portfolio_value: f64,
    /// `portfolio_value − initial_cash`.
    pub total_pnl: f64,
    /// Total P&L as a percentage of initial cash.
    pub pnl_percent: f64,
    /// Orders submitted by this agent.
    pub orders_sent: u64,
    /// Fill events received (not orders completed).
    pub orders_filled: u64,
    /// `orders_filled / orders_sent`, as a percentage.
    pub fill_rate_percent: f64,
    /// Cumulative shares filled.
    pub total_volume: u64,
    /// Average shares per fill event.
    pub avg_order_size: f64,
}

/// An autonomous agent that periodically submits orders to the engine.
///
/// The trader holds an owning handle to the engine while the engine holds
/// only a weak handle back (registered via
/// [`MatchingEngine::register_trader`]), so dropping the trader
/// unregisters it and no reference cycle forms.
pub struct Trader {
    id: String,
    config: TraderConfig,
    engine: Arc<MatchingEngine>,
    state: Mutex<TraderState>,
    running: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Trader {
    /// Create an idle trader. Call [`MatchingEngine::register_trader`]
    /// with the returned handle to receive fills, and [`Trader::start`]
    /// to begin generating flow.
    pub fn new(
        id: impl Into<String>,
        config: TraderConfig,
        engine: Arc<MatchingEngine>,
    ) -> Arc<Trader> {
        Arc::new(Trader {
            id: id.into(),
            state: Mutex::new(TraderState {
                cash: config.initial_cash,
                positions: HashMap::new(),
                average_cost: HashMap::new(),
                reference_prices: HashMap::new(),
                orders_sent: 0,
                orders_filled: 0,
                total_volume: 0,
            }),
            config,
            engine,
            running: AtomicBool::new(false),
            handle: Mutex::new(None),
        })
    }

    /// Trader id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The configuration this agent runs with.
    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    /// Start the agent's own timer thread. Each wakeup, after a uniform
    /// random delay in `[min_interval_ms, max_interval_ms]`, runs one
    /// decision tick. No-op if already trading.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        let trader = Arc::clone(self);
        *lock(&self.handle) = Some(thread::spawn(move || trader.run()));
        debug!(trader_id = %self.id, "trader started");
    }

    /// Halt the tick timer. In-flight and resting orders are left alone;
    /// a trader shutting down does not retract its orders.
    pub fn stop_trading(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = lock(&self.handle).take() {
            let _ = handle.join();
        }
        debug!(trader_id = %self.id, "trader stopped");
    }

    /// Whether the tick timer is running.
    pub fn is_trading(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn run(&self) {
        let mut rng = rand::thread_rng();
        while self.running.load(Ordering::Acquire) {
            let delay = rng.gen_range(self.config.min_interval_ms..=self.config.max_interval_ms);
            thread::sleep(Duration::from_millis(delay));
            if !self.running.load(Ordering::Acquire) {
                break;
            }
            self.tick(&mut rng);
        }
    }

    /// Run one decision tick: pick a symbol, walk its reference price,
    /// choose a side with position-aware bias, size and price the order,
    /// clamp to affordability/availability, and submit.
    ///
    /// Public so stepped simulations can drive agents deterministically
    /// with a seeded RNG instead of the timer thread.
    pub fn tick<R: Rng>(&self, rng: &mut R) {
        let Some(symbol) = self.config.symbols.choose(rng).cloned() else {
            return;
        };

        let (reference, position, cash) = {
            let mut state = lock(&self.state);
            let volatility = self.config.volatility;
            let reference = {
                let entry = state
                    .reference_prices
                    .entry(symbol.clone())
                    .or_insert(self.config.initial_reference_price);
                let drift = 1.0 + rng.gen_range(-volatility..=volatility);
                *entry = (*entry * drift).max(self.config.min_reference_price);
                *entry
            };
            let position = state.positions.get(&symbol).copied().unwrap_or(0);
            (reference, position, state.cash)
        };

        let sell_probability = if position > LONG_BIAS_THRESHOLD {
            0.7
        } else if position == 0 {
            0.3
        } else {
            0.5
        };
        let side = if rng.gen_range(0.0..1.0) < sell_probability {
            Side::Sell
        } else {
            Side::Buy
        };

        let mut quantity =
            rng.gen_range(self.config.min_order_size..=self.config.max_order_size);
        let u: f64 = rng.gen_range(-self.config.volatility..=self.config.volatility);
        let raw_price = match side {
            Side::Buy => reference * (1.0 - u.abs()),
            Side::Sell => reference * (1.0 + u.abs()),
        };
        let limit = (raw_price * 100.0).round() / 100.0;

        match side {
            Side::Buy => {
                if quantity as f64 * limit > cash {
                    quantity = if limit > 0.0 {
                        (cash / limit).floor().max(0.0) as u64
                    } else {
                        0
                    };
                }
            }
            Side::Sell => {
                if quantity as i64 > position {
                    quantity = position.max(0) as u64;
                }
            }
        }
        if quantity < self.config.min_order_size {
            trace!(trader_id = %self.id, %symbol, "tick skipped after clamping");
            return;
        }

        let Ok(price) = Price::from_f64(limit) else {
            trace!(trader_id = %self.id, %symbol, limit, "tick skipped: degenerate price");
            return;
        };
        let order = match Order::new(self.id.clone(), symbol.clone(), side, quantity, price) {
            Ok(order) => order,
            Err(err) => {
                warn!(trader_id = %self.id, %err, "order construction failed");
                return;
            }
        };
        match self.engine.submit(order) {
            Ok(order_id) => {
                lock(&self.state).orders_sent += 1;
                trace!(trader_id = %self.id, %order_id, %symbol, %side, quantity, %price, "order sent");
            }
            Err(err) => warn!(trader_id = %self.id, %err, "submission rejected"),
        }
    }

    /// Current cash balance.
    pub fn cash(&self) -> f64 {
        lock(&self.state).cash
    }

    /// Net share count in `symbol`, 0 when never traded.
    pub fn position(&self, symbol: &str) -> i64 {
        lock(&self.state)
            .positions
            .get(symbol)
            .copied()
            .unwrap_or(0)
    }

    /// Average cost basis for `symbol`, 0 when flat.
    pub fn average_cost(&self, symbol: &str) -> f64 {
        lock(&self.state)
            .average_cost
            .get(symbol)
            .copied()
            .unwrap_or(0.0)
    }

    /// The agent's current price estimate for `symbol`.
    pub fn reference_price(&self, symbol: &str) -> f64 {
        lock(&self.state)
            .reference_prices
            .get(symbol)
            .copied()
            .unwrap_or(self.config.initial_reference_price)
    }

    /// Orders submitted so far.
    pub fn orders_sent(&self) -> u64 {
        lock(&self.state).orders_sent
    }

    /// Fill events received so far.
    pub fn orders_filled(&self) -> u64 {
        lock(&self.state).orders_filled
    }

    /// Cumulative shares filled.
    pub fn total_volume(&self) -> u64 {
        lock(&self.state).total_volume
    }

    /// Cash plus every position valued at the agent's reference price.
    pub fn portfolio_value(&self) -> f64 {
        let state = lock(&self.state);
        let positions: f64 = state
            .positions
            .iter()
            .map(|(symbol, quantity)| {
                let reference = state
                    .reference_prices
                    .get(symbol)
                    .copied()
                    .unwrap_or(self.config.initial_reference_price);
                *quantity as f64 * reference
            })
            .sum();
        state.cash + positions
    }

    /// `portfolio_value − initial_cash`.
    pub fn total_pnl(&self) -> f64 {
        self.portfolio_value() - self.config.initial_cash
    }

    /// Unrealized P&L for one symbol:
    /// `position · reference − position · average_cost`.
    pub fn pnl_for_symbol(&self, symbol: &str) -> f64 {
        let state = lock(&self.state);
        let position = state.positions.get(symbol).copied().unwrap_or(0) as f64;
        let reference = state
            .reference_prices
            .get(symbol)
            .copied()
            .unwrap_or(self.config.initial_reference_price);
        let cost = state.average_cost.get(symbol).copied().unwrap_or(0.0);
        position * reference - position * cost
    }

    /// Snapshot of the agent's performance for reporting.
    pub fn performance(&self) -> TraderPerformance {
        let portfolio_value = self.portfolio_value();
        let state = lock(&self.state);
        let total_pnl = portfolio_value - self.config.initial_cash;
        TraderPerformance {
            trader_id: self.id.clone(),
            initial_cash: self.config.initial_cash,
            cash: state.cash,
            portfolio_value,
            total_pnl,
            pnl_percent: if self.config.initial_cash != 0.0 {
                total_pnl / self.config.initial_cash * 100.0
            } else {
                0.0
            },
            orders_sent: state.orders_sent,
            orders_filled: state.orders_filled,
            fill_rate_percent: if state.orders_sent > 0 {
                state.orders_filled as f64 / state.orders_sent as f64 * 100.0
            } else {
                0.0
            },
            total_volume: state.total_volume,
            avg_order_size: if state.orders_filled > 0 {
                state.total_volume as f64 / state.orders_filled as f64
            } else {
                0.0
            },
        }
    }
}

impl FillHandler for Trader {
    fn trader_id(&self) -> &str {
        &self.id
    }

    /// Update cash, position, and average cost for one execution.
    ///
    /// Runs on the matcher thread; keeps the guard only long enough to
    /// mutate the accounting.
    fn on_fill(&self, fill: &FillEvent) {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        let notional = fill.quantity as f64 * fill.price.to_f64();
        let old_position = state
            .positions
            .get(&fill.symbol)
            .copied()
            .unwrap_or(0);
        match fill.side {
            Side::Buy => {
                state.cash -= notional;
                let new_position = old_position + fill.quantity as i64;
                let average = state
                    .average_cost
                    .entry(fill.symbol.clone())
                    .or_insert(0.0);
                if new_position == 0 {
                    *average = 0.0;
                } else if old_position <= 0 {
                    *average = fill.price.to_f64();
                } else {
                    *average =
                        (*average * old_position as f64 + notional) / new_position as f64;
                }
                state.positions.insert(fill.symbol.clone(), new_position);
            }
            Side::Sell => {
                state.cash += notional;
                let new_position = old_position - fill.quantity as i64;
                state.positions.insert(fill.symbol.clone(), new_position);
                if new_position == 0 {
                    state.average_cost.insert(fill.symbol.clone(), 0.0);
                }
            }
        }
        state.orders_filled += 1;
        state.total_volume += fill.quantity;
        trace!(
            trader_id = %self.id,
            symbol = %fill.symbol,
            side = %fill.side,
            quantity = fill.quantity,
            price = %fill.price,
            cash = state.cash,
            "fill applied"
        );
    }
}
