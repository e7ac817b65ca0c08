//! Full-frame dispatch benchmarks.
//!
//! Run with: cargo bench -p lightstream-bench --bench dispatch

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use lightstream_bench::fixtures::{
    delta_frame, executions_frame, mixed_feed, snapshot_frame, subscription, ticker_frame,
};
use lightstream_bench::latency::LatencyCollector;
use lightstream_bench::throughput::replay;
use lightstream_marketdata::{FeedDispatcher, MarketStore};
use std::hint::black_box;
use std::sync::Arc;

fn dispatcher() -> FeedDispatcher {
    let dispatcher = FeedDispatcher::new(subscription().unwrap(), Arc::new(MarketStore::default()));
    dispatcher.on_frame(&snapshot_frame(100));
    dispatcher
}

fn benchmark_on_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_on_frame");
    group.throughput(Throughput::Elements(1));

    let delta = delta_frame(1, 100);
    let ticker = ticker_frame(1);
    let executions = executions_frame(0, 10, 64);

    group.bench_function("board_delta", |b| {
        let d = dispatcher();
        b.iter(|| black_box(d.on_frame(black_box(&delta))))
    });
    group.bench_function("ticker", |b| {
        let d = dispatcher();
        b.iter(|| black_box(d.on_frame(black_box(&ticker))))
    });
    group.bench_function("executions_x10", |b| {
        let d = dispatcher();
        b.iter(|| black_box(d.on_frame(black_box(&executions))))
    });

    group.finish();
}

fn benchmark_mixed_feed(c: &mut Criterion) {
    let feed = mixed_feed(1_000, 100);
    let mut group = c.benchmark_group("dispatch_mixed_feed");
    group.throughput(Throughput::Elements(feed.len() as u64));

    group.bench_function("replay", |b| {
        b.iter(|| {
            let d = FeedDispatcher::new(subscription().unwrap(), Arc::new(MarketStore::default()));
            black_box(replay(&feed, |frame| {
                d.on_frame(frame);
            }))
        })
    });

    group.finish();

    let d = FeedDispatcher::new(subscription().unwrap(), Arc::new(MarketStore::default()));
    let mut latency = LatencyCollector::new().unwrap();
    for frame in &feed {
        latency.measure(|| d.on_frame(frame));
    }
    if let Some(stats) = latency.stats() {
        println!(
            "dispatch latency: p50={:?} p99={:?} p99.9={:?} max={:?} (n={})",
            stats.median, stats.p99, stats.p999, stats.max, stats.count
        );
    }
}

criterion_group!(benches, benchmark_on_frame, benchmark_mixed_feed);
criterion_main!(benches);
