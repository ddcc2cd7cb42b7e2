//! Pink noise, in three flavors.
//!
//! Power falls 3 dB per octave, so each octave carries equal energy. Most
//! listeners hear this as balanced, like steady rain.
//!
//! # Variations
//!
//! - `pink` uses Kellet's refined filter (most accurate)
//! - `pink_economy` uses Kellet's three-pole filter (cheapest)
//! - `pink_rbj` uses Bristow-Johnson's 3-pole/3-zero filter

use crate::program::{NodeDescription, PresetDescription};

fn pinked(name: &str, filter: &str) -> PresetDescription {
    PresetDescription::new(
        name,
        vec![
            NodeDescription::generator("uniform"),
            NodeDescription::pinking(filter),
        ],
    )
}

pub fn pink() -> PresetDescription {
    pinked("pink", "pk3")
}

pub fn pink_economy() -> PresetDescription {
    pinked("pink economy", "pke")
}

pub fn pink_rbj() -> PresetDescription {
    pinked("pink rbj", "rbj")
}
