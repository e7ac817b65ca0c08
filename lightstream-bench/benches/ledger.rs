//! Execution ledger benchmarks.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lightstream_bench::fixtures::executions_message;
use lightstream_marketdata::{Execution, ExecutionLedger, MAX_LIMIT_LEN};
use std::hint::black_box;

fn batch(start: u64, count: u64, distinct_ids: u64) -> Vec<Execution> {
    serde_json::from_value(executions_message(start, count, distinct_ids)).unwrap()
}

fn full_ledger(distinct_ids: u64) -> ExecutionLedger {
    let mut ledger = ExecutionLedger::new();
    ledger.append_batch(batch(0, MAX_LIMIT_LEN as u64, distinct_ids));
    ledger.evict_to_capacity();
    ledger
}

fn benchmark_append_evict(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_append_evict");

    for size in [1u64, 10, 100] {
        group.throughput(Throughput::Elements(size));
        let incoming = batch(MAX_LIMIT_LEN as u64, size, 64);

        group.bench_with_input(BenchmarkId::from_parameter(size), &incoming, |b, incoming| {
            let mut ledger = full_ledger(64);
            b.iter(|| {
                ledger.append_batch(incoming.iter().cloned());
                black_box(ledger.evict_to_capacity())
            })
        });
    }

    group.finish();
}

fn benchmark_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_lookup");
    let ledger = full_ledger(64);

    group.bench_function("by_buy_id", |b| {
        b.iter(|| black_box(ledger.executions_for(black_box(Some("JRF-B-7")))))
    });
    group.bench_function("by_sell_id", |b| {
        b.iter(|| black_box(ledger.executions_for(black_box(Some("JRF-S-7")))))
    });
    group.bench_function("all", |b| b.iter(|| black_box(ledger.executions_for(None))));

    group.finish();
}

criterion_group!(benches, benchmark_append_evict, benchmark_lookup);
criterion_main!(benches);
