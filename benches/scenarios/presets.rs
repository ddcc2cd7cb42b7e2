//! Benchmarks for complete presets.
//!
//! `program/*` times the node graph alone; `engine/*` adds the stereo field,
//! auto-gain and ramp on top, writing into an interleaved device buffer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use noisy_dsp::{
    engine::{Engine, EngineConfig},
    presets,
    program::{BuildOptions, ProgramBuilder},
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;

pub fn bench_presets(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/presets");
    let options = BuildOptions {
        seed: Some(99),
        ..BuildOptions::default()
    };

    for preset in presets::all() {
        let id = preset.name.replace(' ', "_");

        for &size in BLOCK_SIZES {
            let mut left = vec![0.0f32; size];
            let mut right = vec![0.0f32; size];

            let mut program = ProgramBuilder::new(&preset, 2, SAMPLE_RATE)
                .options(options)
                .build()
                .unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("program/{id}"), size),
                &size,
                |b, _| {
                    b.iter(|| program.process(black_box(&mut left), Some(&mut right[..])))
                },
            );
        }
    }

    // Full engine path for the heaviest preset
    let (mut engine, mut controller) = Engine::new(EngineConfig {
        build: options,
        ..EngineConfig::default()
    });
    controller.build_program(&presets::waterfall()).unwrap();
    controller.play();

    for &size in BLOCK_SIZES {
        let mut data = vec![0.0f32; size * 2];
        group.bench_with_input(BenchmarkId::new("engine/waterfall", size), &size, |b, _| {
            b.iter(|| engine.process_interleaved(black_box(&mut data), 2))
        });
    }

    group.finish();
}
