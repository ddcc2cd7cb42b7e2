//! Preset descriptions and the programs built from them.
//!
//! A [`PresetDescription`] is plain data. [`ProgramBuilder`] validates it and
//! instantiates a [`Program`]: one shared head chain plus a chain per output
//! channel, optionally with auto-gain scalars measured at build time.
//!
//! # Example
//!
//! ```
//! use noisy_dsp::program::{NodeDescription, PresetDescription, ProgramBuilder};
//!
//! let preset = PresetDescription::new(
//!     "pink",
//!     vec![
//!         NodeDescription::generator("uniform"),
//!         NodeDescription::pinking("pk3"),
//!     ],
//! );
//!
//! let mut program = ProgramBuilder::new(&preset, 2, 48_000.0)
//!     .for_auto_gain(true)
//!     .build()
//!     .unwrap();
//!
//! let mut left = [0.0f32; 256];
//! let mut right = [0.0f32; 256];
//! program.process(&mut left, Some(&mut right[..]));
//! ```

pub mod auto_gain;
mod builder;
mod description;
mod error;

pub use builder::{build, BuildOptions, ProgramBuilder};
pub use description::{AutoGainSettings, NodeDescription, ParamValue, PresetDescription};
pub use error::BuildError;

use crate::{
    dsp::stereo::{apply_volume_and_balance, apply_width, matched_pair, StereoField},
    graph::{GraphNode, NodeList},
};

/// A built node graph for one preset, ready to run on the audio thread.
#[derive(Debug)]
pub struct Program {
    name: String,
    sample_rate: f64,
    channel_count: usize,
    head: NodeList,
    left: NodeList,
    right: Option<NodeList>,
    auto_gain: Option<(f32, f32)>,
}

impl Program {
    /// Render one block in place.
    ///
    /// Each channel runs through the head chain and then its own chain. The
    /// head chain is shared, so its state carries from left into right. A
    /// mono program ignores `right`; a stereo program given no `right` only
    /// renders left.
    pub fn process(&mut self, left: &mut [f32], right: Option<&mut [f32]>) {
        if left.is_empty() {
            return;
        }

        self.head.process(left);
        self.left.process(left);

        if let (Some(chain), Some(right)) = (self.right.as_mut(), right) {
            debug_assert_eq!(left.len(), right.len());
            self.head.process(right);
            chain.process(right);
        }
    }

    /// [`process`](Self::process) plus the output stage: a mono program is
    /// copied into `right`, then `field`'s width, volume (times auto-gain)
    /// and balance are applied.
    pub fn render(&mut self, field: &StereoField, left: &mut [f32], right: Option<&mut [f32]>) {
        let (left, mut right) = matched_pair(left, right);

        self.process(left, right.as_deref_mut());
        let (gain_left, gain_right) = self.auto_gain();

        if let Some(right) = right.as_deref_mut() {
            if self.channel_count == 1 {
                right.copy_from_slice(left);
            }
            apply_width(field.width, left, right);
        }

        apply_volume_and_balance(
            field.volume * gain_left,
            field.volume * gain_right,
            field.balance,
            left,
            right,
        );
    }

    /// Left and right loudness scalars, or `(1.0, 1.0)` when the program was
    /// built without calibration.
    pub fn auto_gain(&self) -> (f32, f32) {
        self.auto_gain.unwrap_or((1.0, 1.0))
    }

    pub fn has_auto_gain(&self) -> bool {
        self.auto_gain.is_some()
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nodes at the top level of each chain, as (head, left, right).
    pub fn chain_lengths(&self) -> (usize, usize, usize) {
        (
            self.head.len(),
            self.left.len(),
            self.right.as_ref().map_or(0, NodeList::len),
        )
    }
}
