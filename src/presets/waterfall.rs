//! Waterfall.
//!
//! Two layers summed by a split: a pink body with its top end rolled off,
//! and a brown undercurrent. A low shelf adds weight and a one-pole low-pass
//! takes the edge off the spray.
//!
//! # How It Works
//!
//! 1. Branch 0: uniform noise, PK3 pinking, -3 dB
//! 2. Branch 1: brownian walk, DC blocked, -6 dB
//! 3. Sum, then shelf and low-pass the mix

use crate::program::{NodeDescription, PresetDescription};

pub fn waterfall() -> PresetDescription {
    PresetDescription::new(
        "waterfall",
        vec![
            NodeDescription::split(vec![
                vec![
                    NodeDescription::generator("uniform"),
                    NodeDescription::pinking("pk3"),
                    NodeDescription::gain(-3.0),
                ],
                vec![
                    NodeDescription::generator("brownian"),
                    NodeDescription::dc_block(),
                    NodeDescription::gain(-6.0),
                ],
            ]),
            NodeDescription::biquads(&[
                ("lowshelf", 200.0, 0.7, 4.0),
                ("highpass", 25.0, 0.7, 0.0),
            ]),
            NodeDescription::one_pole("lowpass", 6_000.0),
        ],
    )
}
