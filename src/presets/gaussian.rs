//! Gaussian white noise.
//!
//! Same flat spectrum as `white`, but sample values cluster around zero
//! instead of spreading evenly. Peaks are rarer, so it sounds a little
//! softer at the same RMS level.

use crate::program::{NodeDescription, PresetDescription};

pub fn gaussian() -> PresetDescription {
    PresetDescription::new("gaussian", vec![NodeDescription::generator("gaussian")])
}
