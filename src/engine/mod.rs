//! Render/control split for hosts that drive the noise engine from an audio
//! callback.
//!
//! [`Engine::new`] returns two halves. [`Engine`] lives in the audio callback
//! and never allocates, locks or frees. [`EngineController`] lives anywhere
//! else: it builds programs, swaps them in through a lock-free ring, and
//! drops the ones the render side hands back.

mod controller;
mod message;

pub use controller::{EngineController, EngineError};
pub use message::EngineMessage;

use rtrb::{Consumer, Producer, RingBuffer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        amplify::clear,
        stereo::{matched_pair, StereoField},
    },
    program::{BuildOptions, Program},
    ramp::Ramper,
    MAX_BLOCK_SIZE,
};

/*
Render Order
============

Every block goes through the same fixed chain:

  program ──→ mono copy ──→ width ──→ volume × auto-gain, balance ──→ ramper
  (or zeros)  (L → R when                                           (play/pause)
              the program
              is mono)

Messages from the controller are drained first, so a program swap or a
stereo change always lands on a block boundary. The replaced program goes
straight back to the controller through the retire ring; dropping it there
keeps deallocation off the audio thread.
*/

const MESSAGE_QUEUE_SIZE: usize = 64;
const RETIRE_QUEUE_SIZE: usize = 8;

/// Fade lengths in seconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeDurations {
    pub play: f64,
    pub pause: f64,
    /// Used both for muting and unmuting.
    pub mute: f64,
}

impl Default for FadeDurations {
    fn default() -> Self {
        Self {
            play: 0.5,
            pause: 0.25,
            mute: 1.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f64,
    /// 1 (mono) or 2 (stereo).
    pub channel_count: usize,
    pub fade: FadeDurations,
    /// Initial stereo field.
    pub stereo: StereoField,
    pub build: BuildOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            channel_count: 2,
            fade: FadeDurations::default(),
            stereo: StereoField::default(),
            build: BuildOptions::default(),
        }
    }
}

/// Render-side half of the engine. Owned by the audio callback.
pub struct Engine {
    rx: Consumer<EngineMessage>,
    retired: Producer<Box<Program>>,
    program: Option<Box<Program>>,
    stereo: StereoField,
    ramper: Ramper,
    channel_count: usize,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> (Engine, EngineController) {
        let (tx, rx) = RingBuffer::<EngineMessage>::new(MESSAGE_QUEUE_SIZE);
        let (retired_tx, retired_rx) = RingBuffer::<Box<Program>>::new(RETIRE_QUEUE_SIZE);

        let ramper = Ramper::new();
        let controller = EngineController::new(
            tx,
            retired_rx,
            ramper.controller(),
            config,
            RETIRE_QUEUE_SIZE,
        );

        let engine = Engine {
            rx,
            retired: retired_tx,
            program: None,
            stereo: config.stereo.clamped(),
            ramper,
            channel_count: config.channel_count.clamp(1, 2),
            left: vec![0.0; MAX_BLOCK_SIZE],
            right: vec![0.0; MAX_BLOCK_SIZE],
        };

        (engine, controller)
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    /// Render one block into separate channel buffers. Pass `None` for
    /// `right` on a mono output. When the channels differ in length, frames
    /// past the shorter one are silenced.
    pub fn process(&mut self, left: &mut [f32], right: Option<&mut [f32]>) {
        self.drain_messages();
        let (left, mut right) = matched_pair(left, right);

        let Some(program) = self.program.as_deref_mut() else {
            clear(left);
            if let Some(right) = right {
                clear(right);
            }
            return;
        };

        program.render(&self.stereo, left, right.as_deref_mut());
        self.ramper.process(left, right);
    }

    /// Render into an interleaved device buffer with `channels` channels.
    /// Channels past the second are silenced.
    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }

        let stereo = self.channel_count == 2 && channels >= 2;

        for frame_block in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let frames = frame_block.len() / channels;

            // Move the scratch out so `process` can borrow self mutably.
            let mut left = std::mem::take(&mut self.left);
            let mut right = std::mem::take(&mut self.right);
            {
                let left = &mut left[..frames];
                let right = &mut right[..frames];
                if stereo {
                    self.process(left, Some(&mut *right));
                } else {
                    self.process(left, None);
                }

                for (i, frame) in frame_block.chunks_exact_mut(channels).enumerate() {
                    frame[0] = left[i];
                    if channels >= 2 {
                        frame[1] = if stereo { right[i] } else { left[i] };
                    }
                    for sample in frame.iter_mut().skip(2) {
                        *sample = 0.0;
                    }
                }
            }
            self.left = left;
            self.right = right;
        }
    }

    fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.pop() {
            match message {
                EngineMessage::LoadProgram(program) => self.replace_program(Some(program)),
                EngineMessage::ClearProgram => self.replace_program(None),
                EngineMessage::SetStereoField(field) => self.stereo = field,
            }
        }
    }

    fn replace_program(&mut self, program: Option<Box<Program>>) {
        if let Some(old) = std::mem::replace(&mut self.program, program) {
            // The controller never has more programs outstanding than the
            // retire ring holds, so this push only fails if it was dropped.
            let _ = self.retired.push(old);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        presets,
        program::{BuildError, NodeDescription, PresetDescription},
    };

    fn config() -> EngineConfig {
        EngineConfig {
            fade: FadeDurations {
                play: 0.0,
                pause: 0.0,
                mute: 0.0,
            },
            build: BuildOptions {
                seed: Some(21),
                ..BuildOptions::default()
            },
            ..EngineConfig::default()
        }
    }

    fn render(engine: &mut Engine, frames: usize) -> (Vec<f32>, Vec<f32>) {
        let mut left = vec![0.0; frames];
        let mut right = vec![0.0; frames];
        engine.process(&mut left, Some(&mut right[..]));
        (left, right)
    }

    fn is_silent(buffer: &[f32]) -> bool {
        buffer.iter().all(|&s| s == 0.0)
    }

    #[test]
    fn test_silent_without_program() {
        let (mut engine, mut controller) = Engine::new(config());
        controller.play();

        let (left, right) = render(&mut engine, 256);
        assert!(is_silent(&left) && is_silent(&right));
        assert!(!engine.has_program());
    }

    #[test]
    fn test_silent_until_played() {
        let (mut engine, mut controller) = Engine::new(config());
        controller.build_program(&presets::pink()).unwrap();

        let (left, _) = render(&mut engine, 256);
        assert!(is_silent(&left), "paused engines output silence");
        assert!(engine.has_program());

        controller.play();
        let (left, right) = render(&mut engine, 256);
        assert!(!is_silent(&left) && !is_silent(&right));
        assert!(left.iter().chain(&right).all(|s| s.abs() < 1.0));
    }

    #[test]
    fn test_pause_and_toggle() {
        let (mut engine, mut controller) = Engine::new(config());
        controller.build_program(&presets::white()).unwrap();

        controller.toggle();
        assert!(controller.is_playing());
        assert!(!is_silent(&render(&mut engine, 128).0));

        controller.toggle();
        assert!(!controller.is_playing());
        assert!(is_silent(&render(&mut engine, 128).0));
    }

    #[test]
    fn test_mute_silences_without_pausing() {
        let (mut engine, mut controller) = Engine::new(config());
        controller.build_program(&presets::white()).unwrap();
        controller.play();
        assert!(!is_silent(&render(&mut engine, 128).0));

        controller.set_muted(true);
        assert!(controller.is_muted());
        assert!(controller.is_playing(), "muting keeps the play state");
        assert!(is_silent(&render(&mut engine, 128).0));

        // Pausing and resuming while muted stays silent.
        controller.pause();
        controller.play();
        assert!(is_silent(&render(&mut engine, 128).0));

        controller.set_muted(false);
        assert!(!is_silent(&render(&mut engine, 128).0));
    }

    #[test]
    fn test_unmute_while_paused_stays_silent() {
        let (mut engine, mut controller) = Engine::new(config());
        controller.build_program(&presets::pink()).unwrap();

        controller.set_muted(true);
        controller.set_muted(false);
        assert!(!controller.is_playing());
        assert!(is_silent(&render(&mut engine, 128).0));
    }

    #[test]
    fn test_mismatched_channel_lengths_are_trimmed() {
        let (mut engine, mut controller) = Engine::new(config());
        controller.build_program(&presets::white()).unwrap();
        controller.play();

        let mut left = vec![1.0f32; 300];
        let mut right = vec![1.0f32; 100];
        engine.process(&mut left, Some(&mut right[..]));

        assert!(!is_silent(&left[..100]));
        assert!(is_silent(&left[100..]));
        assert!(right.iter().all(|s| s.abs() < 1.0));
    }

    #[test]
    fn test_mono_program_is_duplicated() {
        let (mut engine, mut controller) = Engine::new(config());
        let program = crate::program::build(&presets::brown(), 1, 48_000.0, false).unwrap();
        controller.set_program(program).unwrap();
        controller.play();

        let (left, right) = render(&mut engine, 512);
        assert_eq!(left, right);
        assert!(!is_silent(&left));
    }

    #[test]
    fn test_stereo_field_is_applied() {
        let (mut engine, mut controller) = Engine::new(config());
        controller.build_program(&presets::white()).unwrap();
        controller
            .set_stereo_field(StereoField::new(1.0, 1.0, 1.0))
            .unwrap();
        controller.play();

        let (left, right) = render(&mut engine, 256);
        assert!(is_silent(&left), "hard right balance silences the left channel");
        assert!(!is_silent(&right));
        assert_eq!(controller.stereo_field().balance, 1.0);
    }

    #[test]
    fn test_volume_scales_output() {
        let white = PresetDescription::new(
            "seeded",
            vec![NodeDescription::generator("uniform").with("seed", 1)],
        );
        let render_at = |volume: f32| {
            let (mut engine, mut controller) = Engine::new(config());
            controller
                .set_program(crate::program::build(&white, 2, 48_000.0, false).unwrap())
                .unwrap();
            controller
                .set_stereo_field(StereoField::new(volume, 1.0, 0.0))
                .unwrap();
            controller.play();
            render(&mut engine, 64).0
        };

        let full = render_at(1.0);
        let half = render_at(0.5);
        assert!(!is_silent(&full));
        for (f, h) in full.iter().zip(&half) {
            assert!((f * 0.5 - h).abs() < 1e-6);
        }
    }

    #[test]
    fn test_replaced_programs_come_back_for_dropping() {
        let (mut engine, mut controller) = Engine::new(config());

        let first = crate::program::build(&presets::white(), 2, 48_000.0, false).unwrap();
        controller.set_program(first).unwrap();
        render(&mut engine, 16);
        assert_eq!(controller.collect_garbage(), 0);

        let second = crate::program::build(&presets::pink(), 2, 48_000.0, false).unwrap();
        controller.set_program(second).unwrap();
        render(&mut engine, 16);
        assert_eq!(controller.collect_garbage(), 1);

        controller.clear_program().unwrap();
        render(&mut engine, 16);
        assert_eq!(controller.collect_garbage(), 1);
        assert!(!engine.has_program());
    }

    #[test]
    fn test_pending_program_limit() {
        let (_engine, mut controller) = Engine::new(config());

        for _ in 0..RETIRE_QUEUE_SIZE {
            let program = crate::program::build(&presets::white(), 2, 48_000.0, false).unwrap();
            controller.set_program(program).unwrap();
        }

        let program = crate::program::build(&presets::white(), 2, 48_000.0, false).unwrap();
        assert!(matches!(
            controller.set_program(program),
            Err(EngineError::TooManyPendingPrograms)
        ));
    }

    #[test]
    fn test_build_errors_are_reported() {
        let (_engine, mut controller) = Engine::new(config());
        let broken = PresetDescription::new("broken", vec![NodeDescription::new("laser")]);

        assert!(matches!(
            controller.build_program(&broken),
            Err(EngineError::Build(BuildError::UnknownNodeType { .. }))
        ));
    }

    #[test]
    fn test_interleaved_matches_planar() {
        let make = || {
            let (engine, mut controller) = Engine::new(config());
            let program = crate::program::ProgramBuilder::new(&presets::pink(), 2, 48_000.0)
                .options(config().build)
                .build()
                .unwrap();
            controller.set_program(program).unwrap();
            controller.play();
            (engine, controller)
        };

        let (mut planar, _planar_controller) = make();
        let (left, right) = render(&mut planar, 3000);

        let (mut interleaved, _interleaved_controller) = make();
        let mut data = vec![0.0; 3000 * 3];
        interleaved.process_interleaved(&mut data, 3);

        for i in 0..3000 {
            assert_eq!(data[i * 3], left[i]);
            assert_eq!(data[i * 3 + 1], right[i]);
            assert_eq!(data[i * 3 + 2], 0.0);
        }
    }
}
