//! The matching engine: a single logical serializer over all books.

use super::error::EngineError;
use super::fill::{FillEvent, FillHandler};
use super::stats::{EngineCounters, LatencyWindow, StatsListener};
use crate::orderbook::{
    DEFAULT_BOOK_TRADE_CAPACITY, MakerFill, OrderBook, Trade, TradeId, TradeListener,
};
use crate::types::{Order, OrderId, Side};
use crate::utils::{current_time_millis, lock};
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace};

/// Default capacity of the engine's global trade history.
pub const DEFAULT_TRADE_HISTORY_CAPACITY: usize = 10_000;

/// Default number of latency samples retained for the rolling mean.
pub const DEFAULT_LATENCY_WINDOW: usize = 1000;

/// Capacity knobs for an engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound of the global trade history ring.
    pub trade_history_capacity: usize,
    /// Bound of each book's trade ring.
    pub book_trade_capacity: usize,
    /// Number of latency samples in the rolling window.
    pub latency_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            trade_history_capacity: DEFAULT_TRADE_HISTORY_CAPACITY,
            book_trade_capacity: DEFAULT_BOOK_TRADE_CAPACITY,
            latency_window: DEFAULT_LATENCY_WINDOW,
        }
    }
}

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    /// Constructed, never started.
    Idle,
    /// Worker draining the queue.
    Running,
    /// Stopped after running; restartable.
    Stopped,
}

/// Where an active order lives, for id-based routing.
struct OrderLocation {
    symbol: String,
    side: Side,
}

/// The central serializer: owns the submission queue, routes orders to
/// per-symbol books, matches under price-time priority, emits trades, and
/// dispatches fill notifications.
///
/// `submit` and `cancel` may be called from any thread in any state; only
/// a running engine drains the queue. Matching itself is serialized on a
/// single worker thread, which is what makes the ordering guarantees hold:
/// global matching order is dequeue order, trade ids increase in emit
/// order, and for each trade the buyer's fill callback fires before the
/// seller's, both before any later trade's callbacks.
pub struct MatchingEngine {
    config: EngineConfig,
    /// Per-symbol books, created lazily on first use.
    books: DashMap<String, Arc<OrderBook>>,
    queue_tx: Sender<Order>,
    queue_rx: Receiver<Order>,
    /// Registered fill handlers by trader id. Weak so the engine never
    /// keeps a trader alive.
    traders: DashMap<String, Weak<dyn FillHandler>>,
    /// Active order ids per trader.
    trader_orders: DashMap<String, Vec<OrderId>>,
    /// Authoritative index of live orders.
    active_orders: DashMap<OrderId, OrderLocation>,
    /// Bounded global trade history, oldest evicted first.
    trades: Mutex<VecDeque<Trade>>,
    trade_seq: AtomicU64,
    pub(super) counters: EngineCounters,
    pub(super) latency: LatencyWindow,
    running: AtomicBool,
    ever_started: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
    stats_worker: Mutex<Option<JoinHandle<()>>>,
    pub(super) started_at: Mutex<Option<Instant>>,
    trade_listeners: Mutex<Vec<TradeListener>>,
    stats_listeners: Mutex<Vec<StatsListener>>,
}

impl MatchingEngine {
    /// Create an idle engine with default capacities.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an idle engine with explicit capacities.
    pub fn with_config(config: EngineConfig) -> Self {
        let (queue_tx, queue_rx) = unbounded();
        MatchingEngine {
            latency: LatencyWindow::new(config.latency_window),
            config,
            books: DashMap::new(),
            queue_tx,
            queue_rx,
            traders: DashMap::new(),
            trader_orders: DashMap::new(),
            active_orders: DashMap::new(),
            trades: Mutex::new(VecDeque::new()),
            trade_seq: AtomicU64::new(0),
            counters: EngineCounters::new(),
            running: AtomicBool::new(false),
            ever_started: AtomicBool::new(false),
            worker: Mutex::new(None),
            stats_worker: Mutex::new(None),
            started_at: Mutex::new(None),
            trade_listeners: Mutex::new(Vec::new()),
            stats_listeners: Mutex::new(Vec::new()),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        if self.running.load(Ordering::Acquire) {
            EngineState::Running
        } else if self.ever_started.load(Ordering::Acquire) {
            EngineState::Stopped
        } else {
            EngineState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Spawn the matcher worker and the 1 Hz stats tick. No-op when
    /// already running; a stopped engine restarts and resumes draining
    /// whatever is still queued.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        self.ever_started.store(true, Ordering::Release);
        {
            let mut started = lock(&self.started_at);
            if started.is_none() {
                *started = Some(Instant::now());
            }
        }
        let engine = Arc::clone(self);
        *lock(&self.worker) = Some(thread::spawn(move || engine.run_matcher()));
        let engine = Arc::clone(self);
        *lock(&self.stats_worker) = Some(thread::spawn(move || engine.run_stats_tick()));
        info!("matching engine started");
    }

    /// Halt dequeueing and join the workers. Idempotent. Orders still in
    /// the queue survive and resume on the next `start`.
    ///
    /// Must not be called from a fill callback (it would join the calling
    /// thread).
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = lock(&self.worker).take() {
            let _ = handle.join();
        }
        if let Some(handle) = lock(&self.stats_worker).take() {
            let _ = handle.join();
        }
        info!("matching engine stopped");
    }

    /// Validate and enqueue an order for matching. Returns promptly; the
    /// order is matched when the serializer dequeues it.
    ///
    /// # Errors
    /// [`EngineError::RejectedSubmission`] for an order that is not in an
    /// active state (e.g. resubmission of a filled or cancelled order).
    pub fn submit(&self, order: Order) -> Result<OrderId, EngineError> {
        if !order.is_active() {
            return Err(EngineError::RejectedSubmission {
                reason: format!("order {} is {}", order.id(), order.status()),
            });
        }
        let id = order.id();
        trace!(order_id = %id, symbol = %order.symbol(), side = %order.side(), "submit");
        self.counters.orders_submitted.fetch_add(1, Ordering::Relaxed);
        self.queue_tx
            .send(order)
            .map_err(|_| EngineError::QueueClosed)?;
        Ok(id)
    }

    /// Cancel a resting order by id.
    ///
    /// Returns whether a resting order was found and cancelled. The race
    /// with matching resolves at the per-level lock: a partially filled
    /// order that is resting has its remainder cancelled; an order that
    /// the matcher already consumed (or that was never seen) yields
    /// `false`.
    pub fn cancel(&self, order_id: &OrderId) -> bool {
        let location = match self.active_orders.get(order_id) {
            Some(entry) => (entry.value().symbol.clone(), entry.value().side),
            None => return false,
        };
        let Some(book) = self.books.get(&location.0).map(|b| b.value().clone()) else {
            return false;
        };
        match book.remove(order_id, location.1) {
            Some(mut order) => {
                order.cancel();
                self.active_orders.remove(order_id);
                self.untrack_trader_order(order.trader_id(), order_id);
                debug!(order_id = %order_id, symbol = %location.0, "order cancelled");
                true
            }
            // Not resting: either mid-match or already terminal. The
            // matcher owns the index cleanup in both cases.
            None => false,
        }
    }

    /// The book for `symbol`, created lazily on first use.
    pub fn get_order_book(&self, symbol: &str) -> Arc<OrderBook> {
        let key = symbol.trim().to_ascii_uppercase();
        let capacity = self.config.book_trade_capacity;
        self.books
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OrderBook::with_trade_capacity(&key, capacity)))
            .value()
            .clone()
    }

    /// Bind a trader's fill handler to its trader id. The engine holds a
    /// weak handle, so dropping the trader unregisters it implicitly.
    pub fn register_trader(&self, handler: Arc<dyn FillHandler>) {
        let id = handler.trader_id().to_string();
        debug!(trader_id = %id, "trader registered");
        self.traders.insert(id, Arc::downgrade(&handler));
    }

    /// Subscribe a callback invoked on the matcher thread for every trade.
    pub fn subscribe_trades(&self, listener: TradeListener) {
        lock(&self.trade_listeners).push(listener);
    }

    /// Subscribe a callback for the 1 Hz performance stats publication.
    pub fn subscribe_stats(&self, listener: StatsListener) {
        lock(&self.stats_listeners).push(listener);
    }

    /// Drain and process every queued order on the caller's thread.
    ///
    /// This is the batch-per-quantum realization of the scheduling
    /// contract: deterministic stepped simulations and tests drive the
    /// engine with it instead of (or alongside) the threaded worker, which
    /// uses the same processing path.
    pub fn process_pending(&self) -> usize {
        let mut processed = 0;
        while let Ok(order) = self.queue_rx.try_recv() {
            self.process_order(order);
            processed += 1;
        }
        processed
    }

    /// Number of submitted orders not yet dequeued.
    pub fn pending_orders(&self) -> usize {
        self.queue_rx.len()
    }

    /// Empty the queue, all books, trade history, indexes, and counters.
    pub fn clear(&self) {
        while self.queue_rx.try_recv().is_ok() {}
        for entry in self.books.iter() {
            entry.value().clear();
        }
        self.books.clear();
        self.active_orders.clear();
        self.trader_orders.clear();
        lock(&self.trades).clear();
        self.trade_seq.store(0, Ordering::Release);
        self.counters.reset();
        self.latency.clear();
        let mut started = lock(&self.started_at);
        *started = if self.running.load(Ordering::Acquire) {
            Some(Instant::now())
        } else {
            None
        };
        info!("engine cleared");
    }

    fn run_matcher(&self) {
        debug!("matcher worker running");
        while self.running.load(Ordering::Acquire) {
            match self.queue_rx.recv_timeout(Duration::from_millis(50)) {
                Ok(order) => self.process_order(order),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("matcher worker parked");
    }

    fn run_stats_tick(&self) {
        while self.running.load(Ordering::Acquire) {
            let tick_start = Instant::now();
            thread::sleep(Duration::from_secs(1));
            if !self.running.load(Ordering::Acquire) {
                break;
            }
            let elapsed = tick_start.elapsed().as_secs_f64();
            let processed = self.counters.orders_since_tick.swap(0, Ordering::AcqRel);
            if elapsed > 0.0 {
                self.counters
                    .store_orders_per_second(processed as f64 / elapsed);
            }
            let stats = self.performance_stats();
            let listeners: Vec<StatsListener> = lock(&self.stats_listeners).clone();
            for listener in &listeners {
                listener(&stats);
            }
        }
    }

    /// Match one dequeued order to completion: record arrival, run the
    /// aggressive loop, emit trades and fills, rest the residual.
    fn process_order(&self, mut order: Order) {
        let dequeued = Instant::now();
        let order_id = order.id();
        let trader_id = order.trader_id().to_string();
        self.active_orders.insert(
            order_id,
            OrderLocation {
                symbol: order.symbol().to_string(),
                side: order.side(),
            },
        );
        self.trader_orders
            .entry(trader_id.clone())
            .or_default()
            .push(order_id);

        let book = self.get_order_book(order.symbol());
        match book.execute(&mut order) {
            Ok(fills) => {
                for maker in fills {
                    self.emit_trade(&book, &order, maker);
                }
            }
            Err(err) => {
                error!(order_id = %order_id, %err, "matching aborted");
            }
        }

        if order.is_active() && order.remaining_quantity() > 0 {
            if let Err(err) = book.add(order) {
                error!(order_id = %order_id, %err, "failed to rest residual");
                self.forget_order(&trader_id, &order_id);
            }
        } else {
            self.forget_order(&trader_id, &order_id);
        }

        self.counters.orders_processed.fetch_add(1, Ordering::Relaxed);
        self.counters
            .orders_since_tick
            .fetch_add(1, Ordering::Relaxed);
        self.latency
            .record(dequeued.elapsed().as_secs_f64() * 1000.0);
    }

    /// Build, record, and publish the trade for one maker fill, then
    /// dispatch fill notifications buyer first.
    fn emit_trade(&self, book: &OrderBook, taker: &Order, maker: MakerFill) {
        let seq = self.trade_seq.fetch_add(1, Ordering::AcqRel) + 1;
        let (buyer_id, seller_id, buy_order_id, sell_order_id) = match taker.side() {
            Side::Buy => (
                taker.trader_id().to_string(),
                maker.trader_id.clone(),
                taker.id(),
                maker.order_id,
            ),
            Side::Sell => (
                maker.trader_id.clone(),
                taker.trader_id().to_string(),
                maker.order_id,
                taker.id(),
            ),
        };
        let trade = Trade {
            id: TradeId::from_seq(seq),
            timestamp: current_time_millis(),
            symbol: taker.symbol().to_string(),
            quantity: maker.quantity,
            price: maker.price,
            buyer_id,
            seller_id,
            buy_order_id,
            sell_order_id,
        };

        book.append_trade(trade.clone());
        {
            let mut trades = lock(&self.trades);
            if trades.len() == self.config.trade_history_capacity {
                trades.pop_front();
            }
            trades.push_back(trade.clone());
        }
        self.counters.total_trades.fetch_add(1, Ordering::Relaxed);
        self.counters
            .total_volume
            .fetch_add(maker.quantity, Ordering::Relaxed);

        if maker.maker_filled {
            self.active_orders.remove(&maker.order_id);
            self.untrack_trader_order(&maker.trader_id, &maker.order_id);
        }

        let listeners: Vec<TradeListener> = lock(&self.trade_listeners).clone();
        for listener in &listeners {
            listener(&trade);
        }

        self.dispatch_fill(FillEvent {
            order_id: trade.buy_order_id,
            trader_id: trade.buyer_id.clone(),
            symbol: trade.symbol.clone(),
            side: Side::Buy,
            quantity: trade.quantity,
            price: trade.price,
            timestamp: trade.timestamp,
        });
        self.dispatch_fill(FillEvent {
            order_id: trade.sell_order_id,
            trader_id: trade.seller_id.clone(),
            symbol: trade.symbol.clone(),
            side: Side::Sell,
            quantity: trade.quantity,
            price: trade.price,
            timestamp: trade.timestamp,
        });
    }

    fn dispatch_fill(&self, event: FillEvent) {
        let slot = self
            .traders
            .get(&event.trader_id)
            .map(|entry| entry.value().clone());
        match slot {
            Some(weak) => match weak.upgrade() {
                Some(handler) => handler.on_fill(&event),
                None => {
                    self.traders.remove(&event.trader_id);
                    debug!(trader_id = %event.trader_id, "dropped dead trader handle");
                }
            },
            // Normal for CSV-injected flow: those traders have no handler.
            None => trace!(trader_id = %event.trader_id, "fill for unregistered trader"),
        }
    }

    fn forget_order(&self, trader_id: &str, order_id: &OrderId) {
        self.active_orders.remove(order_id);
        self.untrack_trader_order(trader_id, order_id);
    }

    fn untrack_trader_order(&self, trader_id: &str, order_id: &OrderId) {
        if let Some(mut ids) = self.trader_orders.get_mut(trader_id) {
            ids.retain(|id| id != order_id);
        }
    }

    pub(super) fn books(&self) -> &DashMap<String, Arc<OrderBook>> {
        &self.books
    }

    pub(super) fn global_trades(&self) -> &Mutex<VecDeque<Trade>> {
        &self.trades
    }

    pub(super) fn active_order_count(&self) -> usize {
        self.active_orders.len()
    }

    pub(super) fn active_order_ids(&self, trader_id: &str) -> Vec<OrderId> {
        self.trader_orders
            .get(trader_id)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    pub(super) fn locate(&self, order_id: &OrderId) -> Option<(String, Side)> {
        self.active_orders
            .get(order_id)
            .map(|entry| (entry.value().symbol.clone(), entry.value().side))
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}
