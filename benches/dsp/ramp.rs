//! Benchmarks for the play/pause ramper.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use noisy_dsp::ramp::Ramper;

use crate::BLOCK_SIZES;

pub fn bench_ramp(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ramp");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.5f32; size];
        let mut right = vec![0.5f32; size];

        // Fast path: fully open, nothing to do per sample
        let mut steady = Ramper::new();
        steady.update(true, 0);
        group.bench_with_input(BenchmarkId::new("steady", size), &size, |b, _| {
            b.iter(|| steady.process(black_box(&mut left), Some(&mut right[..])))
        });

        // Always mid-fade: retrigger a long fade each iteration
        let mut fading = Ramper::new();
        let mut playing = false;
        group.bench_with_input(BenchmarkId::new("fading", size), &size, |b, _| {
            b.iter(|| {
                playing = !playing;
                fading.update(playing, 48_000);
                fading.process(black_box(&mut left), Some(&mut right[..]));
            })
        });
    }

    group.finish();
}
