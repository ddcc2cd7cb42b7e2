//! Click-free play/pause envelope shared between a control thread and the
//! audio callback.

use std::sync::Arc;

use crossbeam::atomic::AtomicCell;

use crate::{
    dsp::{
        amplify::{apply_gain, clear, multiply_in_place},
        stereo::matched_pair,
    },
    RAMP_BLOCK_SIZE,
};

/*
Play/Pause Ramps
================

Starting or stopping noise abruptly clicks. The ramper fades the output in
and out over a requested number of frames.

Vocabulary
----------

  volume      the ramper's linear position, 0.0 (silent) to 1.0 (full)
  target      where the current ramp ends: 0.0 when paused, 1.0 when playing
  step        how far volume moves per frame: (target - volume) / frames
  remaining   frames left in the current ramp

The Shape: x⁴
-------------

The linear position is raised to the fourth power before it multiplies the
signal. Loudness is perceived roughly logarithmically, so a linear fade
seems to rush through the quiet part; x⁴ spends longer near silence.

  gain
    1.0 ┤                     ╭
        │                   ╭─╯
        │                 ╭─╯
        │              ╭──╯
        │          ╭───╯
    0.0 ┼──────────╯
        0                     frames

The State Machine
-----------------

   ┌────────┐  update(play, n)   ┌─────────┐  n frames  ┌─────────┐
   │ Silent │ ─────────────────→ │ Ramping │ ─────────→ │ Settled │
   └────────┘                    └─────────┘            └─────────┘
                                      ↑  update(!play, n)    │
                                      └──────────────────────┘

  Silent and Settled at 0.0 zero the block outright. Settled at 1.0 leaves
  the block untouched. A ramp of zero frames jumps straight to Settled.

Crossing Threads
----------------

The control side (`RampController`) and the audio side (`Ramper`) share two
small plain values through `AtomicCell`s, each 8 bytes and lock-free:

  requested   written only by the controller, read by the ramper
  applied     written only by the ramper, read by the controller (for UI)

At the start of every block the ramper compares `requested` with what it
last applied. Any difference starts a new ramp from the current volume.
If the controller writes twice before the audio thread looks, only the last
write is seen; intermediate requests are simply skipped.

Envelope values are computed in runs of at most RAMP_BLOCK_SIZE frames so
the scratch buffer stays small and fixed.
*/

/// End point of a ramp.
#[repr(u32)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RampLevel {
    #[default]
    Silent = 0,
    Full = 1,
}

impl RampLevel {
    pub fn volume(self) -> f32 {
        match self {
            RampLevel::Silent => 0.0,
            RampLevel::Full => 1.0,
        }
    }
}

/// A request to ramp to `level` over `frames` frames.
#[repr(C, align(8))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RampTarget {
    pub frames: u32,
    pub level: RampLevel,
}

impl RampTarget {
    pub fn new(should_play: bool, frames: usize) -> Self {
        Self {
            frames: u32::try_from(frames).unwrap_or(u32::MAX),
            level: if should_play {
                RampLevel::Full
            } else {
                RampLevel::Silent
            },
        }
    }

    pub fn is_playing(&self) -> bool {
        self.level == RampLevel::Full
    }
}

#[derive(Debug, Default)]
struct RampShared {
    requested: AtomicCell<RampTarget>,
    applied: AtomicCell<RampTarget>,
}

/// Control-side handle. Publishes ramp requests without ever blocking.
#[derive(Debug)]
pub struct RampController {
    shared: Arc<RampShared>,
}

impl RampController {
    /// Ask the ramper to fade toward playing or paused over `frames` frames.
    pub fn update(&self, should_play: bool, frames: usize) {
        self.shared
            .requested
            .store(RampTarget::new(should_play, frames));
    }

    /// The most recent request, whether or not the audio side has seen it.
    pub fn requested(&self) -> RampTarget {
        self.shared.requested.load()
    }

    /// The request the audio side is currently ramping toward (or settled at).
    pub fn applied(&self) -> RampTarget {
        self.shared.applied.load()
    }

    pub fn is_playing(&self) -> bool {
        self.requested().is_playing()
    }
}

/// Audio-side envelope. Owned by the render callback.
#[derive(Debug)]
pub struct Ramper {
    current_volume: f32,
    target_volume: f32,
    ramp_step: f32,
    remaining_frames: usize,
    scratch: Vec<f32>,
    applied: RampTarget,
    shared: Arc<RampShared>,
}

impl Default for Ramper {
    fn default() -> Self {
        Self::new()
    }
}

impl Ramper {
    pub fn new() -> Self {
        Self {
            current_volume: 0.0,
            target_volume: 0.0,
            ramp_step: 0.0,
            remaining_frames: 0,
            scratch: vec![0.0; RAMP_BLOCK_SIZE],
            applied: RampTarget::default(),
            shared: Arc::new(RampShared::default()),
        }
    }

    /// Create a control handle for another thread.
    pub fn controller(&self) -> RampController {
        RampController {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Same as [`RampController::update`], for hosts that drive both sides
    /// from one place.
    pub fn update(&self, should_play: bool, frames: usize) {
        self.shared
            .requested
            .store(RampTarget::new(should_play, frames));
    }

    pub fn current_volume(&self) -> f32 {
        self.current_volume
    }

    pub fn is_ramping(&self) -> bool {
        self.remaining_frames > 0
    }

    /// Return to silent with no ramp in progress, as if newly created.
    ///
    /// Only call this while no controller is publishing (e.g. between audio
    /// streams); a request racing with the reset may be lost.
    pub fn reset(&mut self) {
        self.current_volume = 0.0;
        self.target_volume = 0.0;
        self.ramp_step = 0.0;
        self.remaining_frames = 0;
        self.applied = RampTarget::default();
        self.shared.requested.store(RampTarget::default());
        self.shared.applied.store(RampTarget::default());
    }

    /// Apply the envelope to one block. `right` may be absent for mono
    /// output. When the channels differ in length, frames past the shorter
    /// one are silenced.
    pub fn process(&mut self, left: &mut [f32], right: Option<&mut [f32]>) {
        let (left, mut right) = matched_pair(left, right);

        let requested = self.shared.requested.load();
        if requested != self.applied {
            self.applied = requested;
            self.shared.applied.store(requested);
            self.start_ramp(requested);
        }

        let frames = left.len();
        let mut offset = 0;

        while offset < frames && self.remaining_frames > 0 {
            let count = (frames - offset)
                .min(RAMP_BLOCK_SIZE)
                .min(self.remaining_frames);
            let end = offset + count;

            self.ramp_span(
                &mut left[offset..end],
                right.as_deref_mut().map(|r| &mut r[offset..end]),
            );
            offset = end;
        }

        if offset < frames {
            self.settled_span(&mut left[offset..], right.map(|r| &mut r[offset..]));
        }
    }

    fn start_ramp(&mut self, target: RampTarget) {
        self.target_volume = target.level.volume();

        if target.frames == 0 {
            self.current_volume = self.target_volume;
            self.ramp_step = 0.0;
            self.remaining_frames = 0;
        } else {
            self.ramp_step = (self.target_volume - self.current_volume) / target.frames as f32;
            self.remaining_frames = target.frames as usize;
        }
    }

    fn ramp_span(&mut self, left: &mut [f32], right: Option<&mut [f32]>) {
        let count = left.len();

        if self.current_volume == 1.0 && self.target_volume == 1.0 {
            // Nothing to do.
        } else if self.current_volume == 0.0 && self.target_volume == 0.0 {
            clear(left);
            if let Some(right) = right {
                clear(right);
            }
        } else {
            let envelope = &mut self.scratch[..count];
            for (i, gain) in envelope.iter_mut().enumerate() {
                let x = (self.current_volume + self.ramp_step * i as f32).clamp(0.0, 1.0);
                let x2 = x * x;
                *gain = x2 * x2;
            }

            multiply_in_place(left, envelope);
            if let Some(right) = right {
                multiply_in_place(right, envelope);
            }

            self.current_volume += self.ramp_step * count as f32;
        }

        self.remaining_frames -= count;
        if self.remaining_frames == 0 {
            self.current_volume = self.target_volume;
        }
    }

    fn settled_span(&mut self, left: &mut [f32], right: Option<&mut [f32]>) {
        if self.current_volume == 1.0 {
            return;
        }

        if self.current_volume == 0.0 {
            clear(left);
            if let Some(right) = right {
                clear(right);
            }
            return;
        }

        let x2 = self.current_volume * self.current_volume;
        apply_gain(left, x2 * x2);
        if let Some(right) = right {
            apply_gain(right, x2 * x2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ones(len: usize) -> Vec<f32> {
        vec![1.0; len]
    }

    /// Run `frames` frames through the ramper in blocks of `block`, returning
    /// the gain applied to each frame.
    fn envelope(ramper: &mut Ramper, frames: usize, block: usize) -> Vec<f32> {
        let mut out = ones(frames);
        for chunk in out.chunks_mut(block) {
            ramper.process(chunk, None);
        }
        out
    }

    #[test]
    fn test_new_ramper_is_silent() {
        let mut ramper = Ramper::new();
        let gains = envelope(&mut ramper, 1000, 256);
        assert!(gains.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_play_ramps_up_monotonically_to_one() {
        let mut ramper = Ramper::new();
        ramper.update(true, 4800);

        let gains = envelope(&mut ramper, 4800, 1024);

        assert_eq!(gains[0], 0.0, "ramp starts from silence");
        for pair in gains.windows(2) {
            assert!(pair[1] >= pair[0], "ramp must not dip: {} → {}", pair[0], pair[1]);
        }
        assert!(gains[4799] < 1.0 && gains[4799] > 0.99);
        assert_eq!(ramper.current_volume(), 1.0);
        assert!(!ramper.is_ramping());

        let after = envelope(&mut ramper, 512, 512);
        assert!(after.iter().all(|&g| g == 1.0), "settled at full is a no-op");
    }

    #[test]
    fn test_pause_ramps_back_to_exactly_zero() {
        let mut ramper = Ramper::new();
        ramper.update(true, 0);
        envelope(&mut ramper, 16, 16);
        assert_eq!(ramper.current_volume(), 1.0);

        ramper.update(false, 2000);
        let gains = envelope(&mut ramper, 2000, 300);

        assert_eq!(gains[0], 1.0);
        for pair in gains.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert_eq!(ramper.current_volume(), 0.0);

        let after = envelope(&mut ramper, 64, 64);
        assert!(after.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_curve_is_fourth_power() {
        let mut ramper = Ramper::new();
        ramper.update(true, 100);
        let gains = envelope(&mut ramper, 100, 100);

        // Halfway along the linear ramp the gain is 0.5⁴.
        assert!((gains[50] - 0.0625).abs() < 1e-5, "got {}", gains[50]);
    }

    #[test]
    fn test_repeated_request_is_a_no_op() {
        let mut ramper = Ramper::new();
        ramper.update(true, 256);
        envelope(&mut ramper, 512, 512);

        ramper.update(true, 256);
        let gains = envelope(&mut ramper, 512, 512);
        assert!(gains.iter().all(|&g| g == 1.0));
    }

    #[test]
    fn test_zero_frame_ramp_jumps() {
        let mut ramper = Ramper::new();
        ramper.update(true, 0);
        let gains = envelope(&mut ramper, 128, 128);
        assert!(gains.iter().all(|&g| g == 1.0));
    }

    #[test]
    fn test_last_request_wins() {
        let mut ramper = Ramper::new();
        let controller = ramper.controller();

        controller.update(true, 1000);
        controller.update(false, 1000);

        let gains = envelope(&mut ramper, 256, 256);
        assert!(gains.iter().all(|&g| g == 0.0));
        assert_eq!(controller.applied(), RampTarget::new(false, 1000));
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_block_size_does_not_change_the_curve() {
        let mut a = Ramper::new();
        a.update(true, 3000);
        let one_block = envelope(&mut a, 3000, 3000);

        let mut b = Ramper::new();
        b.update(true, 3000);
        let small_blocks = envelope(&mut b, 3000, 97);

        for (i, (x, y)) in one_block.iter().zip(&small_blocks).enumerate() {
            assert!((x - y).abs() < 1e-4, "frame {i}: {x} vs {y}");
        }
    }

    #[test]
    fn test_stereo_channels_get_same_gain() {
        let mut ramper = Ramper::new();
        ramper.update(true, 700);

        let mut left = ones(1000);
        let mut right = vec![0.5; 1000];
        ramper.process(&mut left, Some(&mut right[..]));

        for i in 0..1000 {
            assert!((right[i] - left[i] * 0.5).abs() < 1e-7);
        }
    }

    #[test]
    fn test_mismatched_channels_do_not_panic() {
        let mut ramper = Ramper::new();
        ramper.update(true, 300);

        let mut left = ones(512);
        let mut right = ones(200);
        ramper.process(&mut left, Some(&mut right[..]));

        assert!(left[200..].iter().all(|&s| s == 0.0));
        assert_eq!(&left[..200], &right[..]);
    }

    #[test]
    fn test_reversal_mid_ramp_starts_from_current_volume() {
        let mut ramper = Ramper::new();
        ramper.update(true, 1000);
        envelope(&mut ramper, 500, 500);
        let midway = ramper.current_volume();
        assert!((midway - 0.5).abs() < 1e-4);

        ramper.update(false, 500);
        let gains = envelope(&mut ramper, 500, 500);
        assert!((gains[0] - midway.powi(4)).abs() < 1e-6);
        assert_eq!(ramper.current_volume(), 0.0);
    }

    #[test]
    fn test_reset_returns_to_silence() {
        let mut ramper = Ramper::new();
        let controller = ramper.controller();
        controller.update(true, 0);
        envelope(&mut ramper, 64, 64);

        ramper.reset();
        assert_eq!(controller.requested(), RampTarget::default());
        assert_eq!(controller.applied(), RampTarget::default());

        let gains = envelope(&mut ramper, 64, 64);
        assert!(gains.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_target_cell_is_lock_free() {
        assert!(AtomicCell::<RampTarget>::is_lock_free());
    }
}
