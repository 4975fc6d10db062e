//! Micro-operation benchmarks for the TTL-LRU cache.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency (nanoseconds) for get and put operations
//! under a warm working set, plus a mixed random workload.

use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use lrukit::cache::TtlLruCache;
use lrukit::config::CacheConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 16_384;
const OPS: u64 = 100_000;

fn warm_cache() -> TtlLruCache<u64, u64> {
    let cache = TtlLruCache::new(
        CacheConfig::builder()
            .capacity(CAPACITY)
            .ttl(Duration::from_secs(3_600))
            .cleanup_interval(Duration::from_secs(3_600))
            .record_stats(false)
            .build()
            .unwrap(),
    );
    for i in 0..CAPACITY as u64 {
        cache.put(i, i);
    }
    cache
}

// ============================================================================
// Get Hit Latency (ns/op)
// ============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("ttl_lru", |b| {
        b.iter_custom(|iters| {
            let cache = warm_cache();
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    let key = i % (CAPACITY as u64);
                    black_box(cache.get(&key));
                }
            }
            let elapsed = start.elapsed();
            cache.shutdown();
            elapsed
        })
    });

    group.finish();
}

// ============================================================================
// Put Latency (ns/op), steady-state eviction
// ============================================================================

fn bench_put_evicting(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_evict_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("ttl_lru", |b| {
        b.iter_custom(|iters| {
            let cache = warm_cache();
            let start = Instant::now();
            for iter in 0..iters {
                for i in 0..OPS {
                    // Always-fresh keys keep the cache at capacity, so every
                    // put pays the eviction path.
                    let key = CAPACITY as u64 + iter * OPS + i;
                    cache.put(key, key);
                }
            }
            let elapsed = start.elapsed();
            cache.shutdown();
            elapsed
        })
    });

    group.finish();
}

// ============================================================================
// Mixed Workload (90% get / 10% put, uniform keys)
// ============================================================================

fn bench_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_90_10_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("ttl_lru", |b| {
        b.iter_custom(|iters| {
            let cache = warm_cache();
            let mut rng = StdRng::seed_from_u64(42);
            let start = Instant::now();
            for _ in 0..iters {
                for _ in 0..OPS {
                    let key = rng.gen_range(0..(CAPACITY as u64 * 2));
                    if rng.gen_range(0..10) == 0 {
                        cache.put(key, key);
                    } else {
                        black_box(cache.get(&key));
                    }
                }
            }
            let elapsed = start.elapsed();
            cache.shutdown();
            elapsed
        })
    });

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_put_evicting, bench_mixed);
criterion_main!(benches);
