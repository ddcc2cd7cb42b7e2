use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Small Fixed Filters
===================

DC blocker
----------

Integrated noise (brownian) and some pinking filters drift away from zero.
A DC blocker is a differentiator followed by a leaky integrator:

    y[n] = x[n] - x[n-1] + R·y[n-1]        R = 0.9997

At 48 kHz this puts the corner around 2 Hz, well below anything audible.

One-pole
--------

A single real pole, parameterized by the cutoff as a fraction of the
sample rate (fc = cutoff_hz / sample_rate):

    lowpass:   b1 =  e^(-2π·fc)          a0 = 1 - b1
    highpass:  b1 = -e^(-2π·(0.5 - fc))  a0 = 1 + b1

    y[n] = a0·x[n] + b1·y[n-1]

The highpass mirrors the lowpass pole around Nyquist. Both are the common
exponential approximation and cost one multiply-add per sample.
*/

const DC_BLOCK_POLE: f32 = 0.9997;

#[derive(Debug, Default, Clone)]
pub struct DcBlocker {
    x1: f32,
    y1: f32,
}

impl DcBlocker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        let mut x1 = self.x1;
        let mut y1 = self.y1;

        for sample in buffer.iter_mut() {
            let x0 = *sample;
            y1 = x0 - x1 + DC_BLOCK_POLE * y1;
            x1 = x0;
            *sample = y1;
        }

        self.x1 = x1;
        self.y1 = y1;
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnePoleMode {
    Lowpass,
    Highpass,
}

#[derive(Debug, Clone)]
pub struct OnePole {
    a0: f32,
    b1: f32,
    y1: f32,
}

impl OnePole {
    /// `fc` is the cutoff as a fraction of the sample rate, in `(0, 0.5)`.
    pub fn new(fc: f64, mode: OnePoleMode) -> Self {
        let (a0, b1) = match mode {
            OnePoleMode::Highpass => {
                let b1 = -(-2.0 * PI * (0.5 - fc)).exp();
                (1.0 + b1, b1)
            }
            OnePoleMode::Lowpass => {
                let b1 = (-2.0 * PI * fc).exp();
                (1.0 - b1, b1)
            }
        };

        Self {
            a0: a0 as f32,
            b1: b1 as f32,
            y1: 0.0,
        }
    }

    pub fn lowpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        Self::new(cutoff_hz / sample_rate, OnePoleMode::Lowpass)
    }

    pub fn highpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        Self::new(cutoff_hz / sample_rate, OnePoleMode::Highpass)
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        let a0 = self.a0;
        let b1 = self.b1;
        let mut y1 = self.y1;

        for sample in buffer.iter_mut() {
            y1 = a0 * *sample + b1 * y1;
            *sample = y1;
        }

        self.y1 = y1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (TAU * freq * n as f32 / 48_000.0).sin())
            .collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        buffer[buffer.len() / 2..]
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn test_dc_block_removes_offset() {
        let mut blocker = DcBlocker::new();
        let mut buffer = vec![0.5; 48_000];
        blocker.render(&mut buffer);

        assert!((buffer[0] - 0.5).abs() < 1e-6, "first sample passes the step");
        assert!(buffer[47_999].abs() < 1e-3, "offset should decay, got {}", buffer[47_999]);
    }

    #[test]
    fn test_dc_block_state_continues_across_blocks() {
        let input = sine(50.0, 1000);

        let mut whole = input.clone();
        DcBlocker::new().render(&mut whole);

        let mut blocker = DcBlocker::new();
        let mut pieces = input;
        for chunk in pieces.chunks_mut(64) {
            blocker.render(chunk);
        }

        assert_eq!(whole, pieces);
    }

    #[test]
    fn test_lowpass_settles_on_dc() {
        let mut filter = OnePole::lowpass(1_000.0, 48_000.0);
        let mut buffer = vec![1.0; 2048];
        filter.render(&mut buffer);
        assert!(buffer[2047] > 0.999);
    }

    #[test]
    fn test_highpass_favors_high_frequencies() {
        let mut filter = OnePole::highpass(1_000.0, 48_000.0);
        let mut dc = vec![1.0; 2048];
        filter.render(&mut dc);

        let mut filter = OnePole::highpass(1_000.0, 48_000.0);
        let mut nyquist: Vec<f32> = (0..2048)
            .map(|n| if n % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        filter.render(&mut nyquist);

        let dc_level = dc[2047];
        let nyquist_level = peak_after_transient(&nyquist);
        assert!(
            dc_level < 0.95 && nyquist_level > 0.99,
            "expected DC {dc_level} below Nyquist {nyquist_level}"
        );
    }

    #[test]
    fn test_lowpass_attenuates_above_cutoff() {
        let mut filter = OnePole::lowpass(200.0, 48_000.0);
        let mut buffer = sine(10_000.0, 4096);
        filter.render(&mut buffer);

        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.1, "expected attenuation, got peak {peak}");
    }
}
