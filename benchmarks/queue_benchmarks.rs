use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::thread;
use slotmq::{QueueManager, RingBuffer};

/// Benchmark: fill then drain a single ring buffer
fn bench_ring_fill_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_fill_drain");

    for slot_size in [64usize, 1024, 4096].iter() {
        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(
            BenchmarkId::from_parameter(slot_size),
            slot_size,
            |b, &slot_size| {
                let mut ring = RingBuffer::new(slot_size, 1000).unwrap();
                let payload = vec![7u8; slot_size / 2];

                b.iter(|| {
                    for _ in 0..1000 {
                        ring.add(black_box(&payload)).unwrap();
                    }
                    for _ in 0..1000 {
                        black_box(ring.remove());
                    }
                });
            },
        );
    }
    group.finish();
}

/// Benchmark: add/remove round trip through the manager
fn bench_roundtrip_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip_latency");
    let manager = QueueManager::new(1024, 10_000).unwrap();
    let payload = b"{\"test\":\"data\"}";

    group.bench_function("add_then_remove", |b| {
        b.iter(|| {
            manager.add("bench", black_box(payload)).unwrap();
            black_box(manager.remove("bench"));
        });
    });
    group.finish();
}

/// Benchmark: spreading messages over many channels
fn bench_multiple_channels(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiple_channels");

    for num_channels in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_channels),
            num_channels,
            |b, &num_channels| {
                let manager = QueueManager::new(256, 1000).unwrap();
                let names: Vec<String> =
                    (0..num_channels).map(|i| format!("channel-{}", i)).collect();

                b.iter(|| {
                    for i in 0..1000 {
                        let _ = manager.add(&names[i % num_channels], b"payload");
                    }
                    for i in 0..1000 {
                        black_box(manager.remove(&names[i % num_channels]));
                    }
                });
            },
        );
    }
    group.finish();
}

/// Benchmark: concurrent producers on one channel
fn bench_concurrent_producers(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_producers");

    for num_producers in [1usize, 4, 8].iter() {
        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_producers),
            num_producers,
            |b, &num_producers| {
                b.iter(|| {
                    let manager = Arc::new(QueueManager::new(64, 1000).unwrap());
                    let per_producer = 1000 / num_producers;

                    let handles: Vec<_> = (0..num_producers)
                        .map(|_| {
                            let manager = manager.clone();
                            thread::spawn(move || {
                                for _ in 0..per_producer {
                                    let _ = manager.add("shared", black_box(b"payload"));
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ring_fill_drain,
    bench_roundtrip_latency,
    bench_multiple_channels,
    bench_concurrent_producers
);
criterion_main!(benches);
