//! Benchmarks for the stereo field transforms.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use noisy_dsp::dsp::stereo::{apply_volume_and_balance, apply_width};

use crate::BLOCK_SIZES;

pub fn bench_stereo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/stereo");

    for &size in BLOCK_SIZES {
        let mut left: Vec<f32> = (0..size).map(|i| (i as f32 * 0.01).sin()).collect();
        let mut right: Vec<f32> = (0..size).map(|i| (i as f32 * 0.013).cos()).collect();

        group.bench_with_input(BenchmarkId::new("width", size), &size, |b, _| {
            b.iter(|| apply_width(black_box(0.4), black_box(&mut left), black_box(&mut right)))
        });

        group.bench_with_input(BenchmarkId::new("volume_balance", size), &size, |b, _| {
            b.iter(|| {
                apply_volume_and_balance(
                    black_box(0.8),
                    black_box(0.8),
                    black_box(-0.3),
                    &mut left,
                    Some(&mut right[..]),
                )
            })
        });
    }

    group.finish();
}
