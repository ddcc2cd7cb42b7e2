//! White noise.
//!
//! Flat spectrum: every frequency carries the same power. Bright and hissy;
//! good for masking speech, harsh for long listening.

use crate::program::{NodeDescription, PresetDescription};

pub fn white() -> PresetDescription {
    PresetDescription::new("white", vec![NodeDescription::generator("uniform")])
}
