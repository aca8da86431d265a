//! Скорость восстановления кадров и декодирования CE-потока.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fprint_core::{resync, serialize_table, Decoder, RawStream};
use fprint_types::{Schema, CE_WIDTH, STOP_SYMBOL};

/// CE-поток из `n` записей; каждая 50-я запись без STOP.
fn ce_stream(n: usize) -> Vec<f32> {
    let mut v = Vec::with_capacity(n * CE_WIDTH);

    for i in 0..n {
        v.push(1_000.0 + (i / 400) as f32);
        v.push((i % 100) as f32);
        for p in 0..8 {
            v.push(0.01 * p as f32 + 0.5);
        }
        if i % 50 != 49 {
            v.push(STOP_SYMBOL);
        }
    }

    v
}

fn bench_resync(c: &mut Criterion) {
    let mut group = c.benchmark_group("resync");

    for n in [10_000usize, 100_000] {
        let values = ce_stream(n);
        group.throughput(Throughput::Bytes((values.len() * 4) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| resync(black_box(values), CE_WIDTH, STOP_SYMBOL))
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let schema = Schema::channel_estimate();
    let mut group = c.benchmark_group("decode_ce");

    for n in [10_000usize, 100_000] {
        let stream = RawStream::from_values(&ce_stream(n));
        group.throughput(Throughput::Bytes(stream.as_bytes().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &stream, |b, stream| {
            b.iter(|| Decoder::new(&schema).decode(black_box(stream)))
        });
    }

    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let schema = Schema::channel_estimate();
    let table = Decoder::new(&schema)
        .decode(&RawStream::from_values(&ce_stream(100_000)))
        .table;

    c.bench_function("serialize_fpt_raw", |b| {
        b.iter(|| serialize_table(black_box(&table), false))
    });
    c.bench_function("serialize_fpt_lz4", |b| {
        b.iter(|| serialize_table(black_box(&table), true))
    });
}

criterion_group!(benches, bench_resync, bench_decode, bench_serialize);
criterion_main!(benches);
