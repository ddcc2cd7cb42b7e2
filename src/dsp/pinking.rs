use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Pinking Filters
===============

Pink noise has equal energy per octave, so its power falls 3 dB per octave.
No finite filter has exactly that slope; the three classic approximations
below sum a handful of first-order sections whose corners are spread across
the audio band. All take white noise in and write pink noise out, in place.

  PK3   Paul Kellet's refined design: six leaky integrators, a one-sample
        delayed tap and a direct path. Accurate to ±0.05 dB above 9 Hz.
  PKE   Kellet's economy design: three integrators and a direct path.
        Accurate to ±0.5 dB, cheaper.
  RBJ   Robert Bristow-Johnson's 3-pole/3-zero IIR, with his poles and
        zeros expanded into direct-form coefficients at a gain of 0.2.

Kellet's designs were posted to music-dsp on 1999-10-17, RBJ's on
1998-06-30. See https://www.firstpr.com.au/dsp/pink-noise/#Filtering

All coefficient sets are fixed. Every pole lies inside the unit circle, so
feeding silence lets the state decay to zero.
*/

const KELLET_INPUT_GAIN: f32 = 0.12;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinkingType {
    Pk3,
    Pke,
    Rbj,
}

impl PinkingType {
    pub fn name(self) -> &'static str {
        match self {
            PinkingType::Pk3 => "pk3",
            PinkingType::Pke => "pke",
            PinkingType::Rbj => "rbj",
        }
    }
}

impl fmt::Display for PinkingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PinkingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pk3" => Ok(PinkingType::Pk3),
            "pke" => Ok(PinkingType::Pke),
            "rbj" => Ok(PinkingType::Rbj),
            _ => Err(format!("unknown pinking type '{s}'")),
        }
    }
}

/// Running state for one of the three pinking designs.
#[derive(Debug, Clone)]
pub enum PinkingFilter {
    Pk3 { b: [f32; 7] },
    Pke { b: [f32; 3] },
    Rbj { x: [f32; 3], y: [f32; 3] },
}

impl PinkingFilter {
    pub fn new(kind: PinkingType) -> Self {
        match kind {
            PinkingType::Pk3 => PinkingFilter::Pk3 { b: [0.0; 7] },
            PinkingType::Pke => PinkingFilter::Pke { b: [0.0; 3] },
            PinkingType::Rbj => PinkingFilter::Rbj {
                x: [0.0; 3],
                y: [0.0; 3],
            },
        }
    }

    pub fn kind(&self) -> PinkingType {
        match self {
            PinkingFilter::Pk3 { .. } => PinkingType::Pk3,
            PinkingFilter::Pke { .. } => PinkingType::Pke,
            PinkingFilter::Rbj { .. } => PinkingType::Rbj,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        match self {
            PinkingFilter::Pk3 { b } => render_pk3(b, buffer),
            PinkingFilter::Pke { b } => render_pke(b, buffer),
            PinkingFilter::Rbj { x, y } => render_rbj(x, y, buffer),
        }
    }
}

fn render_pk3(state: &mut [f32; 7], buffer: &mut [f32]) {
    let [mut b0, mut b1, mut b2, mut b3, mut b4, mut b5, mut b6] = *state;

    for sample in buffer.iter_mut() {
        let white = *sample * KELLET_INPUT_GAIN;

        b0 = 0.99886 * b0 + white * 0.055_517_9;
        b1 = 0.99332 * b1 + white * 0.075_075_9;
        b2 = 0.96900 * b2 + white * 0.153_852;
        b3 = 0.86650 * b3 + white * 0.310_485_6;
        b4 = 0.55000 * b4 + white * 0.532_952_2;
        b5 = -0.7616 * b5 - white * 0.016_898;

        *sample = b0 + b1 + b2 + b3 + b4 + b5 + b6 + white * 0.5362;
        b6 = white * 0.115_926;
    }

    *state = [b0, b1, b2, b3, b4, b5, b6];
}

fn render_pke(state: &mut [f32; 3], buffer: &mut [f32]) {
    let [mut b0, mut b1, mut b2] = *state;

    for sample in buffer.iter_mut() {
        let white = *sample * KELLET_INPUT_GAIN;

        b0 = 0.99765 * b0 + white * 0.099_046;
        b1 = 0.96300 * b1 + white * 0.296_516_4;
        b2 = 0.57000 * b2 + white * 1.052_691_3;

        *sample = b0 + b1 + b2 + white * 0.1848;
    }

    *state = [b0, b1, b2];
}

fn render_rbj(x: &mut [f32; 3], y: &mut [f32; 3], buffer: &mut [f32]) {
    let [mut x1, mut x2, mut x3] = *x;
    let [mut y1, mut y2, mut y3] = *y;

    for sample in buffer.iter_mut() {
        let x0 = *sample;
        let y0 = 0.2 * x0 - 0.378_808_6 * x1 + 0.191_712_83 * x2 - 0.012_426_4 * x3
            + 2.479_309 * y1
            - 1.985_012_9 * y2
            + 0.505_600_4 * y3;

        x3 = x2;
        x2 = x1;
        x1 = x0;
        y3 = y2;
        y2 = y1;
        y1 = y0;

        *sample = y0;
    }

    *x = [x1, x2, x3];
    *y = [y1, y2, y3];
}
