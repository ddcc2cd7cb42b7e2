//! Brown noise.
//!
//! A random walk: power falls about 6 dB per octave, leaving a deep rumble
//! like distant surf. The walk drifts slowly, so a DC blocker keeps it
//! centered and a gentle high-pass removes sub-audible movement.

use crate::program::{NodeDescription, PresetDescription};

pub fn brown() -> PresetDescription {
    PresetDescription::new(
        "brown",
        vec![
            NodeDescription::generator("brownian"),
            NodeDescription::dc_block(),
            NodeDescription::biquad("highpass", 20.0, 0.5, 0.0),
        ],
    )
}
