//! Low-level DSP primitives used by the graph nodes.
//!
//! These components are allocation-free and realtime-safe once constructed.
//! They stay focused on the signal-processing math so the graph layer can
//! concentrate on ownership and composition.

/// Vector helpers: scalar gain, summing, multiplication.
pub mod amplify;
/// Biquad coefficient calculator and cascade processor.
pub mod biquad;
/// DC blocker and one-pole filters.
pub mod filter;
/// xoshiro256** noise source with uniform, gaussian and brownian fills.
pub mod noise;
/// Pink noise colorations.
pub mod pinking;
/// Stereo width, volume and balance.
pub mod stereo;
