//! # Shipment-Chain Benchmarks
//!
//! Hot paths of the write pipeline:
//!
//! | Subsystem | Operation | Expectation |
//! |-----------|-----------|-------------|
//! | sc-01 Shard Assignment | `assign_shard` | constant time in shard count |
//! | shared-types | `metadata_digest` | linear in payload size |
//! | sc-02 Write Batcher | `route_write` | constant time |
//! | sc-02 Write Batcher | `flush` | linear in queued writes |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use serde_json::json;

use sc_01_shard_assignment::{assign_shard, ShardAssigner, ShardConfig};
use sc_02_write_batcher::{route_write, BatcherConfig, ShipmentSyncApi, WriteBatcher};
use shared_bus::InMemoryEventBus;
use shared_types::{metadata_digest, InMemoryRecordStore, MockLedgerGateway, NewShipment};

// ============================================================================
// SC-01: Shard Assignment
// ============================================================================

fn bench_shard_assignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-01-shard-assignment");
    group.measurement_time(Duration::from_secs(5));

    let mut rng = rand::thread_rng();
    let ids: Vec<String> = (0..1_000)
        .map(|_| format!("VCN{:012}", rng.gen_range(0..1_000_000_000_000u64)))
        .collect();

    for shard_count in [16u16, 256, 1024] {
        group.throughput(Throughput::Elements(ids.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("assign_shard_1000_ids", shard_count),
            &shard_count,
            |b, &count| {
                b.iter(|| {
                    for id in &ids {
                        black_box(assign_shard(id, count));
                    }
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Shared Types: Metadata Digest
// ============================================================================

fn bench_metadata_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-types-digest");
    group.measurement_time(Duration::from_secs(5));

    for fields in [4usize, 32, 256] {
        let payload: serde_json::Map<String, serde_json::Value> = (0..fields)
            .map(|i| (format!("field_{i}"), json!({"value": i, "label": "x".repeat(16)})))
            .collect();
        let payload = serde_json::Value::Object(payload);

        group.bench_with_input(BenchmarkId::new("metadata_digest", fields), &payload, |b, p| {
            b.iter(|| black_box(metadata_digest(p)))
        });
    }

    group.finish();
}

// ============================================================================
// SC-02: Routing and Flush
// ============================================================================

fn bench_write_batcher(c: &mut Criterion) {
    let mut group = c.benchmark_group("sc-02-write-batcher");
    group.measurement_time(Duration::from_secs(10));

    let sharding = ShardAssigner::new(ShardConfig::for_testing()).unwrap();
    let config = BatcherConfig {
        write_interval_ms: 5_000,
        bridge_enabled: true,
        ..BatcherConfig::default()
    };
    group.bench_function("route_write", |b| {
        let mut shard = 0u16;
        b.iter(|| {
            shard = (shard + 1) % 4;
            black_box(route_write(&sharding, &config, shard, None))
        })
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    for queued in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(queued as u64));
        group.bench_with_input(BenchmarkId::new("flush", queued), &queued, |b, &queued| {
            b.iter_batched(
                || {
                    let batcher = WriteBatcher::new(
                        BatcherConfig {
                            write_interval_ms: 5_000,
                            ..BatcherConfig::default()
                        },
                        Arc::new(ShardAssigner::new(ShardConfig::default()).unwrap()),
                        Arc::new(MockLedgerGateway::new()),
                        Arc::new(InMemoryRecordStore::new()),
                        Arc::new(InMemoryEventBus::new()),
                    );
                    runtime.block_on(async {
                        for n in 0..queued {
                            let _ = batcher
                                .create_shipment(NewShipment::with_id(format!("S{n}"), json!({})), true)
                                .await;
                        }
                    });
                    batcher
                },
                |batcher| runtime.block_on(async { black_box(batcher.flush().await) }),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shard_assignment, bench_metadata_digest, bench_write_batcher);

criterion_main!(benches);
