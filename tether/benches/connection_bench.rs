// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::{BenchmarkId, Criterion, Throughput};
use futures::{stream, StreamExt};
use std::hint::black_box;
use std::time::Duration;
use tether::{from_transformer, to_transformer};
use tether_core::{
    transformer_fn, Connectable, Connection, ItemStream, StreamItem, StreamTransformer,
};
use tether_test_utils::{InstrumentedConnectable, RecordingConsumer};
use tokio::runtime::Runtime;

const SIZES: [u64; 3] = [100, 1_000, 10_000];

pub fn bench_to_transformer(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_transformer");
    let rt = Runtime::new().unwrap();

    for &size in &SIZES {
        group.throughput(Throughput::Elements(size));
        let id = BenchmarkId::from_parameter(format!("sync_connection_{size}"));
        group.bench_with_input(id, &size, |bencher, &size| {
            let transformer = to_transformer(InstrumentedConnectable::new(|v: u64| v + 1));
            bencher.iter(|| {
                rt.block_on(async {
                    let upstream: ItemStream<u64> =
                        stream::iter((0..size).map(StreamItem::Value)).boxed();
                    let count = transformer.apply(upstream).count().await;
                    black_box(count);
                });
            });
        });
    }

    group.finish();
}

pub fn bench_from_transformer(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_transformer");
    let rt = Runtime::new().unwrap();

    for &size in &SIZES {
        group.throughput(Throughput::Elements(size));
        let id = BenchmarkId::from_parameter(format!("map_pipeline_{size}"));
        group.bench_with_input(id, &size, |bencher, &size| {
            let connectable = from_transformer(transformer_fn(
                |upstream: ItemStream<u64>| -> ItemStream<u64> {
                    upstream.map(|item| item.map(|v| v * 2)).boxed()
                },
            ));
            bencher.iter(|| {
                rt.block_on(async {
                    let recorder = RecordingConsumer::new();
                    let connection = connectable.connect(recorder.consumer()).unwrap();
                    for v in 0..size {
                        connection.accept(v);
                    }
                    recorder
                        .wait_for(size as usize, Duration::from_secs(10))
                        .await;
                    connection.dispose();
                    black_box(recorder.len());
                });
            });
        });
    }

    group.finish();
}
