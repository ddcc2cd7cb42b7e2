//! Benchmarks for the noise sources.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand_core::SeedableRng;
use noisy_dsp::dsp::noise::{fill_gaussian, fill_uniform, BrownianWalk, Xoshiro256StarStar};

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        group.bench_with_input(BenchmarkId::new("uniform", size), &size, |b, _| {
            b.iter(|| fill_uniform(&mut rng, black_box(&mut buffer)))
        });

        let mut rng = Xoshiro256StarStar::seed_from_u64(2);
        group.bench_with_input(BenchmarkId::new("gaussian", size), &size, |b, _| {
            b.iter(|| fill_gaussian(&mut rng, black_box(&mut buffer)))
        });

        // Brownian integrates a uniform block in place
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        let mut walk = BrownianWalk::new();
        group.bench_with_input(BenchmarkId::new("brownian", size), &size, |b, _| {
            b.iter(|| {
                fill_uniform(&mut rng, &mut buffer);
                walk.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
