//! Built-in presets.
//!
//! Each preset is a ready-made [`PresetDescription`]. Hand one to the
//! program builder to hear it, or read them to learn how noise colors are
//! put together from generators, pinking filters and biquads.
//!
//! # Example
//!
//! ```
//! use noisy_dsp::{presets, program::ProgramBuilder};
//!
//! let preset = presets::pink();
//! let program = ProgramBuilder::new(&preset, 2, 48_000.0).build();
//! assert!(program.is_ok());
//!
//! for preset in presets::all() {
//!     println!("{}", preset.name);
//! }
//! ```

mod brown;
mod gaussian;
mod pink;
mod waterfall;
mod white;

pub use brown::brown;
pub use gaussian::gaussian;
pub use pink::{pink, pink_economy, pink_rbj};
pub use waterfall::waterfall;
pub use white::white;

use crate::program::PresetDescription;

/// Every built-in preset, in menu order.
pub fn all() -> Vec<PresetDescription> {
    vec![
        white(),
        pink(),
        pink_economy(),
        pink_rbj(),
        brown(),
        gaussian(),
        waterfall(),
    ]
}

/// Look up a built-in preset by name (case-insensitive).
pub fn by_name(name: &str) -> Option<PresetDescription> {
    all()
        .into_iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}
