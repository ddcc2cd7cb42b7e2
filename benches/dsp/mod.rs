//! Benchmarks for low-level DSP primitives.

mod biquad;
mod noise;
mod pinking;
mod ramp;
mod stereo;

pub use biquad::bench_biquad;
pub use noise::bench_noise;
pub use pinking::bench_pinking;
pub use ramp::bench_ramp;
pub use stereo::bench_stereo;
