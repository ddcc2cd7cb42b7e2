#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::amplify::{apply_gain, clear};

/*
Stereo Field
============

Two stateless transforms run after the noise graph, once per block.

Width
-----

Width blends each channel with its opposite:

    l' = l·my + r·other        my    = (width + 1) / 2
    r' = r·my + l·other        other = (width - 1) / -2

     width =  1    my = 1,   other = 0     untouched
     width =  0    my = ½,   other = ½     mono, both sides hold (l + r) / 2
     width = -1    my = 0,   other = 1     channels swapped

Volume and balance
------------------

Balance in [-1, 1] tilts level toward one side without boosting either:

    left  multiplier = min(1 - balance, 1)
    right multiplier = min(1 + balance, 1)

At balance = 1 the left channel is silent; at -1 the right is. Each
multiplier is then scaled by its channel's volume and applied as a single
gain across the block.
*/

/// The user-facing stereo parameters consumed by the transforms below.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoField {
    /// Linear output volume, `0.0..=1.0` in practice.
    pub volume: f32,
    /// `-1.0..=1.0`; 1 leaves the image alone, 0 folds it to mono.
    pub width: f32,
    /// `-1.0..=1.0`; negative leans left, positive leans right.
    pub balance: f32,
}

impl Default for StereoField {
    fn default() -> Self {
        Self {
            volume: 1.0,
            width: 1.0,
            balance: 0.0,
        }
    }
}

impl StereoField {
    pub fn new(volume: f32, width: f32, balance: f32) -> Self {
        Self {
            volume,
            width,
            balance,
        }
    }

    /// Returns a copy with width and balance clamped to `[-1, 1]` and volume to `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            volume: self.volume.clamp(0.0, 1.0),
            width: self.width.clamp(-1.0, 1.0),
            balance: self.balance.clamp(-1.0, 1.0),
        }
    }
}

pub fn apply_width(width: f32, left: &mut [f32], right: &mut [f32]) {
    let width = width.clamp(-1.0, 1.0);
    if width == 1.0 {
        return;
    }

    let my_width = (width + 1.0) * 0.5;
    let other_width = (width - 1.0) * -0.5;

    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        let (dry_l, dry_r) = (*l, *r);
        *l = dry_l * my_width + dry_r * other_width;
        *r = dry_r * my_width + dry_l * other_width;
    }
}

/// Scale each channel by its volume and balance multiplier. A missing right
/// channel is skipped.
pub fn apply_volume_and_balance(
    left_volume: f32,
    right_volume: f32,
    balance: f32,
    left: &mut [f32],
    right: Option<&mut [f32]>,
) {
    let (left_multiplier, right_multiplier) = balance_multipliers(balance);

    apply_gain(left, left_multiplier * left_volume);
    if let Some(right) = right {
        apply_gain(right, right_multiplier * right_volume);
    }
}

/// Trim a channel pair to its common length. Frames past the shorter
/// channel are silenced.
pub fn matched_pair<'a>(
    left: &'a mut [f32],
    right: Option<&'a mut [f32]>,
) -> (&'a mut [f32], Option<&'a mut [f32]>) {
    let Some(right) = right else {
        return (left, None);
    };

    let frames = left.len().min(right.len());
    let (left, left_tail) = left.split_at_mut(frames);
    let (right, right_tail) = right.split_at_mut(frames);
    clear(left_tail);
    clear(right_tail);

    (left, Some(right))
}

#[inline]
pub fn balance_multipliers(balance: f32) -> (f32, f32) {
    let balance = balance.clamp(-1.0, 1.0);
    ((1.0 - balance).min(1.0), (1.0 + balance).min(1.0))
}
