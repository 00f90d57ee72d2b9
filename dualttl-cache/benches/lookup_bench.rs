//! Criterion benchmarks for the memoizer: cached hit, forced miss, contended hit.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dualttl_cache::Memoizer;

fn bench_hit(c: &mut Criterion) {
    let memo = Memoizer::new(|n: &u64| n % 2 == 0, Duration::from_secs(3600), Duration::from_secs(3600));
    for n in 0..1024 {
        memo.lookup(&n);
    }
    let mut g = c.benchmark_group("lookup");
    g.throughput(Throughput::Elements(1));
    g.bench_function("hit", |b| {
        let mut n = 0u64;
        b.iter(|| {
            n = (n + 1) % 1024;
            black_box(memo.lookup(&n))
        });
    });
    g.finish();
}

fn bench_miss(c: &mut Criterion) {
    // Zero TTL on both sides: every lookup recomputes
    let memo = Memoizer::new(|n: &u64| n % 2 == 0, Duration::ZERO, Duration::ZERO);
    let mut g = c.benchmark_group("lookup");
    g.throughput(Throughput::Elements(1));
    g.bench_function("miss", |b| {
        b.iter(|| black_box(memo.lookup(&42)));
    });
    g.finish();
}

fn bench_contended_hit(c: &mut Criterion) {
    let memo = Arc::new(Memoizer::new(
        |s: &String| s.len() % 2 == 0,
        Duration::from_secs(3600),
        Duration::from_secs(3600),
    ));
    let key = "contended".to_string();
    memo.lookup(&key);

    let mut g = c.benchmark_group("lookup");
    g.throughput(Throughput::Elements(4 * 1000));
    g.bench_function("contended_hit_4x1000", |b| {
        b.iter(|| {
            thread::scope(|s| {
                for _ in 0..4 {
                    s.spawn(|| {
                        for _ in 0..1000 {
                            black_box(memo.lookup(&key));
                        }
                    });
                }
            });
        });
    });
    g.finish();
}

criterion_group!(benches, bench_hit, bench_miss, bench_contended_hit);
criterion_main!(benches);
