//! Scalar and vector gain primitives.

/*
Gain, Summing and Decibels
==========================

Almost every stage of the noise engine ends in one of three vector
operations:

  scale     out[i] = x[i] × g          gain nodes, volume, balance
  sum       out[i] = x[i] + y[i]       split nodes folding branches back
  multiply  out[i] = x[i] × m[i]       the ramper's envelope

Levels are authored in decibels because hearing is logarithmic:

    amplitude = 10^(dB / 20)

      0 dB  →  ×1.0   (unity)
     -6 dB  →  ×0.501
    -20 dB  →  ×0.1
    +20 dB  →  ×10.0

The conversion happens once when a node is built. Nothing in this file
allocates, so every function is safe to call from the audio callback.
*/

/// Convert a decibel value to a linear amplitude multiplier.
#[inline]
pub fn db_to_amplitude(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear amplitude multiplier to decibels.
#[inline]
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    20.0 * amplitude.log10()
}

/// Multiply a signal by a constant gain factor (in-place).
#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}

/// Add `other` into `signal` sample by sample.
#[inline]
pub fn add_in_place(signal: &mut [f32], other: &[f32]) {
    debug_assert_eq!(signal.len(), other.len());

    for (s, &o) in signal.iter_mut().zip(other.iter()) {
        *s += o;
    }
}

/// Multiply a signal by a modulator, writing result into signal buffer (in-place).
#[inline]
pub fn multiply_in_place(signal: &mut [f32], modulator: &[f32]) {
    debug_assert_eq!(signal.len(), modulator.len());

    for (s, &m) in signal.iter_mut().zip(modulator.iter()) {
        *s *= m;
    }
}

/// Fill a signal with silence.
#[inline]
pub fn clear(signal: &mut [f32]) {
    signal.fill(0.0);
}
