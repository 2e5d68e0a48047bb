//! Criterion microbenches for mask decoding and tracing.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Compressed RLE parsing (decode_compressed_counts)
//! - Bit-packed mask decoding (BitBuffer::decode)
//! - Boundary tracing (trace_counts)

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use masktrace::mask::rle::{decode_compressed_counts, encode_compressed_rle};
use masktrace::mask::{BitBuffer, ColumnMajor, Dims, Mask};
use masktrace::trace::trace_counts;

const SIZE: u32 = 256;

/// Concentric square rings, which give many loops and holes.
fn rings_mask() -> Mask<ColumnMajor> {
    Mask::from_fn(Dims::new(SIZE, SIZE), |row, col| {
        let edge = row.min(col).min(SIZE as usize - 1 - row).min(SIZE as usize - 1 - col);
        (edge / 4) % 2 == 0
    })
}

/// Pseudo-random speckle from a fixed linear congruential sequence.
fn speckle_mask() -> Mask<ColumnMajor> {
    let mut state = 0x2545_f491u32;
    Mask::from_fn(Dims::new(SIZE, SIZE), |_, _| {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (state >> 16) % 3 == 0
    })
}

/// Benchmark compressed RLE parsing.
fn bench_rle_parse(c: &mut Criterion) {
    let text = encode_compressed_rle(&speckle_mask().to_counts());
    let mut group = c.benchmark_group("rle_parse");
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("decode_compressed_counts", |b| {
        b.iter(|| {
            let counts = decode_compressed_counts(black_box(&text)).unwrap();
            black_box(counts)
        })
    });

    group.finish();
}

/// Benchmark bit-packed decoding.
fn bench_bitbuffer_decode(c: &mut Criterion) {
    let packed = BitBuffer::encode_counts(&speckle_mask().to_counts());
    let mut group = c.benchmark_group("bitbuffer");
    group.throughput(Throughput::Elements((SIZE * SIZE) as u64));

    group.bench_function("decode", |b| {
        b.iter(|| {
            let bits = black_box(&packed).decode().unwrap();
            black_box(bits)
        })
    });

    group.finish();
}

/// Benchmark tracing on two mask shapes.
fn bench_trace(c: &mut Criterion) {
    let mut group = c.benchmark_group("trace");
    group.throughput(Throughput::Elements((SIZE * SIZE) as u64));

    for (name, mask) in [("rings", rings_mask()), ("speckle", speckle_mask())] {
        let counts = mask.to_counts();
        group.bench_function(name, |b| {
            b.iter(|| {
                let loops = trace_counts(black_box(&counts), SIZE).unwrap();
                black_box(loops)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rle_parse, bench_bitbuffer_decode, bench_trace);
criterion_main!(benches);
