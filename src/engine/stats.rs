//! Rolling performance counters for the engine.

use crate::utils::lock;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter block shared between the matcher, the stats tick, and
/// external readers. Readers never observe torn values.
pub(crate) struct EngineCounters {
    pub orders_submitted: AtomicU64,
    pub orders_processed: AtomicU64,
    /// Orders processed since the last 1 Hz stats tick.
    pub orders_since_tick: AtomicU64,
    pub total_trades: AtomicU64,
    pub total_volume: AtomicU64,
    /// Latest rolling orders/s figure, stored as f64 bits.
    orders_per_second_bits: AtomicU64,
}

impl EngineCounters {
    pub fn new() -> Self {
        EngineCounters {
            orders_submitted: AtomicU64::new(0),
            orders_processed: AtomicU64::new(0),
            orders_since_tick: AtomicU64::new(0),
            total_trades: AtomicU64::new(0),
            total_volume: AtomicU64::new(0),
            orders_per_second_bits: AtomicU64::new(0),
        }
    }

    pub fn orders_per_second(&self) -> f64 {
        f64::from_bits(self.orders_per_second_bits.load(Ordering::Acquire))
    }

    pub fn store_orders_per_second(&self, value: f64) {
        self.orders_per_second_bits
            .store(value.to_bits(), Ordering::Release);
    }

    pub fn reset(&self) {
        self.orders_submitted.store(0, Ordering::Release);
        self.orders_processed.store(0, Ordering::Release);
        self.orders_since_tick.store(0, Ordering::Release);
        self.total_trades.store(0, Ordering::Release);
        self.total_volume.store(0, Ordering::Release);
        self.orders_per_second_bits.store(0, Ordering::Release);
    }
}

/// Bounded window of per-order processing latencies in milliseconds, one
/// sample per dequeue-to-end-of-match span.
pub(crate) struct LatencyWindow {
    samples: Mutex<VecDeque<f64>>,
    capacity: usize,
}

impl LatencyWindow {
    pub fn new(capacity: usize) -> Self {
        LatencyWindow {
            samples: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn record(&self, millis: f64) {
        let mut samples = lock(&self.samples);
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(millis);
    }

    /// Arithmetic mean over the retained samples, 0 when empty.
    pub fn average(&self) -> f64 {
        let samples = lock(&self.samples);
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    pub fn clear(&self) {
        lock(&self.samples).clear();
    }
}

/// Snapshot of the engine's performance counters.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStats {
    /// Trades emitted since start (or last clear).
    pub total_trades: u64,
    /// Shares traded since start (or last clear).
    pub total_volume: u64,
    /// Rolling orders processed per second, sampled at 1 Hz.
    pub orders_per_second: f64,
    /// Cumulative trades per second over engine uptime.
    pub trades_per_second: f64,
    /// Mean dequeue-to-end-of-match latency over the sample window.
    pub avg_latency_ms: f64,
    /// Orders currently live in the engine (resting or being matched).
    pub active_orders: usize,
    /// Number of symbols with a book.
    pub symbols_active: usize,
    /// Seconds since the engine first started.
    pub runtime_seconds: f64,
}

/// Callback receiving the 1 Hz stats publication.
pub type StatsListener = Arc<dyn Fn(&PerformanceStats) + Send + Sync>;
