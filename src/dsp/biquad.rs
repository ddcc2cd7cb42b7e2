use std::{f64::consts::TAU, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Biquad Cascades
===============

A biquad is a second-order IIR section:

    y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]

Noise presets shape their spectrum with short chains of these sections
(a lowpass to darken, a peaking bell to add body, a highshelf to tame
hiss). Chaining sections in series is a "cascade"; its response is the
product of the individual responses.

Coefficients come from Robert Bristow-Johnson's Audio EQ Cookbook:

    w0    = 2π · frequency / sample_rate
    alpha = sin(w0) / (2·Q)
    A     = 10^(gain_db / 40)        (peaking and shelving types only)

Every section is normalized by a0 and stored as five values,

    [b0, b1, b2, a1, a2]

and a cascade of M sections is a flat array of 5·M values. That flat layout
is what the processor consumes, so coefficient math happens once at build
time and the audio path only multiplies and adds.

Delay layout
------------

The processor runs direct form I with a shared delay line of 2·M + 2 values:

    [x1, x2 | y1₀, y2₀ | y1₁, y2₁ | ... | y1ₘ₋₁, y2ₘ₋₁]

The output history of section k doubles as the input history of section
k+1, which is why only two extra slots are needed beyond the outputs.
*/

/// Cookbook response shapes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiquadType {
    Peaking,
    Lowpass,
    Highpass,
    Bandpass,
    Notch,
    Lowshelf,
    Highshelf,
}

impl BiquadType {
    pub fn name(self) -> &'static str {
        match self {
            BiquadType::Peaking => "peaking",
            BiquadType::Lowpass => "lowpass",
            BiquadType::Highpass => "highpass",
            BiquadType::Bandpass => "bandpass",
            BiquadType::Notch => "notch",
            BiquadType::Lowshelf => "lowshelf",
            BiquadType::Highshelf => "highshelf",
        }
    }

    /// Whether the `gain` field changes the response.
    pub fn uses_gain(self) -> bool {
        matches!(
            self,
            BiquadType::Peaking | BiquadType::Lowshelf | BiquadType::Highshelf
        )
    }
}

impl fmt::Display for BiquadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a filter type name is not one of the cookbook shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBiquadType(pub String);

impl fmt::Display for UnknownBiquadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown biquad type '{}'", self.0)
    }
}

impl std::error::Error for UnknownBiquadType {}

impl FromStr for BiquadType {
    type Err = UnknownBiquadType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "peaking" | "peak" | "bell" => Ok(BiquadType::Peaking),
            "lowpass" | "lpf" => Ok(BiquadType::Lowpass),
            "highpass" | "hpf" => Ok(BiquadType::Highpass),
            "bandpass" | "bpf" => Ok(BiquadType::Bandpass),
            "notch" | "bandstop" => Ok(BiquadType::Notch),
            "lowshelf" => Ok(BiquadType::Lowshelf),
            "highshelf" => Ok(BiquadType::Highshelf),
            _ => Err(UnknownBiquadType(s.to_string())),
        }
    }
}

/// Immutable description of one biquad section.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: BiquadType,
    /// Center or corner frequency in Hz.
    pub frequency: f64,
    #[cfg_attr(feature = "serde", serde(rename = "Q"))]
    pub q: f64,
    /// Gain in dB (peaking and shelving types).
    pub gain: f64,
}

impl Biquad {
    pub const DEFAULT_Q: f64 = std::f64::consts::FRAC_1_SQRT_2;

    pub fn new(kind: BiquadType, frequency: f64, q: f64, gain: f64) -> Self {
        Self {
            kind,
            frequency,
            q,
            gain,
        }
    }

    pub fn lowpass(frequency: f64, q: f64) -> Self {
        Self::new(BiquadType::Lowpass, frequency, q, 0.0)
    }

    pub fn highpass(frequency: f64, q: f64) -> Self {
        Self::new(BiquadType::Highpass, frequency, q, 0.0)
    }

    pub fn peaking(frequency: f64, q: f64, gain: f64) -> Self {
        Self::new(BiquadType::Peaking, frequency, q, gain)
    }

    /// Normalized `[b0, b1, b2, a1, a2]` for this section.
    pub fn coefficients(&self, sample_rate: f64) -> [f64; 5] {
        let w0 = TAU * self.frequency / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * self.q);
        let a = 10.0_f64.powf(self.gain / 40.0);

        let (b0, b1, b2, a0, a1, a2) = match self.kind {
            BiquadType::Lowpass => (
                (1.0 - cos_w0) / 2.0,
                1.0 - cos_w0,
                (1.0 - cos_w0) / 2.0,
                1.0 + alpha,
                -2.0 * cos_w0,
                1.0 - alpha,
            ),
            BiquadType::Highpass => (
                (1.0 + cos_w0) / 2.0,
                -(1.0 + cos_w0),
                (1.0 + cos_w0) / 2.0,
                1.0 + alpha,
                -2.0 * cos_w0,
                1.0 - alpha,
            ),
            BiquadType::Bandpass => (
                alpha,
                0.0,
                -alpha,
                1.0 + alpha,
                -2.0 * cos_w0,
                1.0 - alpha,
            ),
            BiquadType::Notch => (
                1.0,
                -2.0 * cos_w0,
                1.0,
                1.0 + alpha,
                -2.0 * cos_w0,
                1.0 - alpha,
            ),
            BiquadType::Peaking => (
                1.0 + alpha * a,
                -2.0 * cos_w0,
                1.0 - alpha * a,
                1.0 + alpha / a,
                -2.0 * cos_w0,
                1.0 - alpha / a,
            ),
            BiquadType::Lowshelf => {
                let k = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 + k),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 - k),
                    (a + 1.0) + (a - 1.0) * cos_w0 + k,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                    (a + 1.0) + (a - 1.0) * cos_w0 - k,
                )
            }
            BiquadType::Highshelf => {
                let k = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 + k),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 - k),
                    (a + 1.0) - (a - 1.0) * cos_w0 + k,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
                    (a + 1.0) - (a - 1.0) * cos_w0 - k,
                )
            }
        };

        [b0 / a0, b1 / a0, b2 / a0, a1 / a0, a2 / a0]
    }
}

/// Write the cascade coefficients for `biquads` into `coefficients`.
///
/// # Panics
/// Panics if `coefficients` holds fewer than `5 * biquads.len()` values.
pub fn fill_coefficients(coefficients: &mut [f64], biquads: &[Biquad], sample_rate: f64) {
    assert!(
        coefficients.len() >= biquads.len() * 5,
        "coefficient buffer holds {} values, {} sections need {}",
        coefficients.len(),
        biquads.len(),
        biquads.len() * 5
    );

    for (section, biquad) in coefficients.chunks_exact_mut(5).zip(biquads) {
        section.copy_from_slice(&biquad.coefficients(sample_rate));
    }
}

/// Allocate and fill a flat coefficient array for `biquads`.
pub fn cascade_coefficients(biquads: &[Biquad], sample_rate: f64) -> Vec<f64> {
    let mut coefficients = vec![0.0; biquads.len() * 5];
    fill_coefficients(&mut coefficients, biquads, sample_rate);
    coefficients
}

/// Direct form I cascade over a flat coefficient array.
#[derive(Debug, Clone)]
pub struct BiquadCascade {
    coefficients: Vec<f64>,
    delay: Vec<f64>,
}

impl BiquadCascade {
    /// # Panics
    /// Panics if the coefficient count is not a multiple of five.
    pub fn new(coefficients: Vec<f64>) -> Self {
        assert!(
            coefficients.len() % 5 == 0,
            "biquad coefficients come in groups of five, got {}",
            coefficients.len()
        );

        let section_count = coefficients.len() / 5;

        Self {
            coefficients,
            delay: vec![0.0; 2 * section_count + 2],
        }
    }

    pub fn from_biquads(biquads: &[Biquad], sample_rate: f64) -> Self {
        Self::new(cascade_coefficients(biquads, sample_rate))
    }

    pub fn section_count(&self) -> usize {
        self.coefficients.len() / 5
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        if self.coefficients.is_empty() {
            return;
        }

        let delay = &mut self.delay;

        for sample in buffer.iter_mut() {
            let mut x = *sample as f64;

            for (k, c) in self.coefficients.chunks_exact(5).enumerate() {
                let i = 2 * k;
                let y = c[0] * x + c[1] * delay[i] + c[2] * delay[i + 1]
                    - c[3] * delay[i + 2]
                    - c[4] * delay[i + 3];

                delay[i + 1] = delay[i];
                delay[i] = x;
                x = y;
            }

            let last = delay.len() - 2;
            delay[last + 1] = delay[last];
            delay[last] = x;

            *sample = x as f32;
        }
    }

    pub fn reset(&mut self) {
        self.delay.fill(0.0);
    }
}
