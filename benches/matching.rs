//! Benchmark of the matching hot path: submit-and-cross plus a sweep
//! through a pre-loaded book.

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use matchbook_rs::prelude::*;
use std::sync::Arc;

fn price(value: f64) -> Price {
    Price::from_f64(value).unwrap()
}

fn bench_simple_cross(c: &mut Criterion) {
    let engine = Arc::new(MatchingEngine::new());
    c.bench_function("simple_cross", |b| {
        b.iter(|| {
            let sell = Order::new("maker", "BENCH", Side::Sell, 10, price(100.0)).unwrap();
            let buy = Order::new("taker", "BENCH", Side::Buy, 10, price(100.0)).unwrap();
            engine.submit(sell).unwrap();
            engine.submit(buy).unwrap();
            engine.process_pending()
        });
    });
}

fn bench_book_sweep(c: &mut Criterion) {
    c.bench_function("sweep_ten_levels", |b| {
        b.iter_batched(
            || {
                let engine = Arc::new(MatchingEngine::new());
                for level in 0..10u64 {
                    let ask_price = price(100.0 + level as f64);
                    let order =
                        Order::new("maker", "BENCH", Side::Sell, 10, ask_price).unwrap();
                    engine.submit(order).unwrap();
                }
                engine.process_pending();
                engine
            },
            |engine| {
                let sweep = Order::new("taker", "BENCH", Side::Buy, 100, price(110.0)).unwrap();
                engine.submit(sweep).unwrap();
                engine.process_pending()
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_simple_cross, bench_book_sweep);
criterion_main!(benches);
