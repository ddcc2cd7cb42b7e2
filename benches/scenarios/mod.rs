//! Real-world scenario benchmarks.
//!
//! These render the built-in presets the way a host would.

mod presets;

pub use presets::bench_presets;
