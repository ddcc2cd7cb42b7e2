//! Benchmarks for the three pinking filters.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand_core::SeedableRng;
use noisy_dsp::dsp::{
    noise::{fill_uniform, Xoshiro256StarStar},
    pinking::{PinkingFilter, PinkingType},
};

use crate::BLOCK_SIZES;

pub fn bench_pinking(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/pinking");

    for &size in BLOCK_SIZES {
        let mut input = vec![0.0f32; size];
        fill_uniform(&mut Xoshiro256StarStar::seed_from_u64(7), &mut input);

        for kind in [PinkingType::Pk3, PinkingType::Pke, PinkingType::Rbj] {
            let mut filter = PinkingFilter::new(kind);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(kind.name(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
