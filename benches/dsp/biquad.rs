//! Benchmarks for biquad cascades.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand_core::SeedableRng;
use noisy_dsp::dsp::{
    biquad::{Biquad, BiquadCascade, BiquadType},
    noise::{fill_uniform, Xoshiro256StarStar},
};

use crate::BLOCK_SIZES;

pub fn bench_biquad(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/biquad");

    let single = [Biquad::lowpass(2_000.0, Biquad::DEFAULT_Q)];
    // Typical shaping EQ: rumble cut, low shelf, two bells, air shelf
    let eq = [
        Biquad::highpass(30.0, 0.5),
        Biquad::new(BiquadType::Lowshelf, 200.0, Biquad::DEFAULT_Q, 3.0),
        Biquad::peaking(1_000.0, 1.0, -2.0),
        Biquad::peaking(3_500.0, 2.0, -4.0),
        Biquad::new(BiquadType::Highshelf, 10_000.0, Biquad::DEFAULT_Q, -6.0),
    ];

    for &size in BLOCK_SIZES {
        let mut input = vec![0.0f32; size];
        fill_uniform(&mut Xoshiro256StarStar::seed_from_u64(11), &mut input);

        for (name, sections) in [("single", &single[..]), ("eq5", &eq[..])] {
            let mut cascade = BiquadCascade::from_biquads(sections, 48_000.0);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    cascade.render(black_box(&mut buffer));
                })
            });
        }
    }

    // Recomputing coefficients is a control-rate cost
    group.bench_function("coefficients/eq5", |b| {
        b.iter(|| black_box(BiquadCascade::from_biquads(black_box(&eq), 48_000.0)))
    });

    group.finish();
}
