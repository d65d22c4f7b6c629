//! Benchmarks for delay computation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowline::backoff::DelayStrategy;
use std::time::Duration;

fn backoff_benchmark(c: &mut Criterion) {
    let fixed = DelayStrategy::fixed(Duration::from_secs(2));
    let linear = DelayStrategy::linear(
        Duration::from_millis(100),
        Duration::from_millis(200),
        Duration::from_secs(5),
    )
    .unwrap();
    let exponential = DelayStrategy::exponential(
        Duration::from_secs(1),
        2.0,
        Duration::from_secs(60),
    )
    .unwrap();

    c.bench_function("fixed", |b| {
        b.iter(|| black_box(fixed.compute(black_box(7))))
    });
    c.bench_function("linear", |b| {
        b.iter(|| black_box(linear.compute(black_box(7))))
    });
    c.bench_function("exponential", |b| {
        b.iter(|| black_box(exponential.compute(black_box(7))))
    });
}

criterion_group!(benches, backoff_benchmark);
criterion_main!(benches);
