use rtrb::{Consumer, Producer, PushError};
use tracing::{debug, info, warn};

use crate::{
    dsp::stereo::StereoField,
    engine::{message::EngineMessage, EngineConfig},
    program::{BuildError, PresetDescription, Program, ProgramBuilder},
    ramp::RampController,
};

/// Why the controller could not hand something to the render side.
#[derive(Debug)]
pub enum EngineError {
    /// The message ring is full; the render side has not kept up
    QueueFull,
    /// Too many programs are waiting to come back from the render side
    TooManyPendingPrograms,
    /// The preset did not build
    Build(BuildError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::QueueFull => write!(f, "engine message queue is full"),
            EngineError::TooManyPendingPrograms => {
                write!(f, "too many retired programs waiting to be collected")
            }
            EngineError::Build(err) => write!(f, "preset failed to build: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Build(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BuildError> for EngineError {
    fn from(err: BuildError) -> Self {
        EngineError::Build(err)
    }
}

/// Control-side half of the engine. Lives on the UI or main thread.
///
/// Programs are built here, sent to the render side whole, and come back
/// through a second ring once replaced so they are dropped here too.
pub struct EngineController {
    tx: Producer<EngineMessage>,
    retired: Consumer<Box<Program>>,
    ramp: RampController,
    config: EngineConfig,
    /// Programs sent and not yet collected, the active one included.
    outstanding: usize,
    retire_capacity: usize,
    playing: bool,
    muted: bool,
}

impl EngineController {
    pub(crate) fn new(
        tx: Producer<EngineMessage>,
        retired: Consumer<Box<Program>>,
        ramp: RampController,
        config: EngineConfig,
        retire_capacity: usize,
    ) -> Self {
        Self {
            tx,
            retired,
            ramp,
            config,
            outstanding: 0,
            retire_capacity,
            playing: false,
            muted: false,
        }
    }

    /// Build `preset` for this engine's format (with auto-gain) and load it.
    pub fn build_program(&mut self, preset: &PresetDescription) -> Result<(), EngineError> {
        let config = &self.config;
        let program = ProgramBuilder::new(preset, config.channel_count, config.sample_rate)
            .for_auto_gain(true)
            .options(config.build)
            .build()
            .inspect_err(|err| warn!(preset = %preset.name, %err, "preset failed to build"))?;

        self.set_program(program)
    }

    /// Hand a finished program to the render side. It takes over at the
    /// start of the next block.
    pub fn set_program(&mut self, program: Program) -> Result<(), EngineError> {
        self.collect_garbage();
        if self.outstanding >= self.retire_capacity {
            return Err(EngineError::TooManyPendingPrograms);
        }

        let name = program.name().to_string();
        let (gain_left, gain_right) = program.auto_gain();

        match self.tx.push(EngineMessage::LoadProgram(Box::new(program))) {
            Ok(()) => {
                self.outstanding += 1;
                info!(preset = %name, gain_left, gain_right, "program loaded");
                Ok(())
            }
            Err(PushError::Full(_)) => Err(EngineError::QueueFull),
        }
    }

    pub fn clear_program(&mut self) -> Result<(), EngineError> {
        self.send(EngineMessage::ClearProgram)
    }

    pub fn set_stereo_field(&mut self, field: StereoField) -> Result<(), EngineError> {
        let field = field.clamped();
        self.send(EngineMessage::SetStereoField(field))?;
        self.config.stereo = field;
        Ok(())
    }

    /// The stereo field most recently sent.
    pub fn stereo_field(&self) -> StereoField {
        self.config.stereo
    }

    pub fn play(&mut self) {
        self.playing = true;
        self.publish_level(self.config.fade.play);
    }

    pub fn pause(&mut self) {
        self.playing = false;
        self.publish_level(self.config.fade.pause);
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Whether the user asked for playback. Muting does not change this.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Fade out (or back in) without touching the play state, e.g. while
    /// another app is making sound.
    pub fn set_muted(&mut self, muted: bool) {
        if self.muted != muted {
            self.muted = muted;
            self.publish_level(self.config.fade.mute);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Whether the output is currently heading towards full level.
    pub fn is_audible(&self) -> bool {
        self.ramp.is_playing()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drop programs the render side has finished with. Returns how many.
    pub fn collect_garbage(&mut self) -> usize {
        let mut collected = 0;
        while let Ok(program) = self.retired.pop() {
            debug!(preset = %program.name(), "dropping retired program");
            drop(program);
            collected += 1;
        }
        self.outstanding = self.outstanding.saturating_sub(collected);
        collected
    }

    fn send(&mut self, message: EngineMessage) -> Result<(), EngineError> {
        self.tx.push(message).map_err(|_| EngineError::QueueFull)
    }

    fn publish_level(&self, fade_seconds: f64) {
        self.ramp.update(
            self.playing && !self.muted,
            self.fade_frames(fade_seconds),
        );
    }

    fn fade_frames(&self, seconds: f64) -> usize {
        (seconds.max(0.0) * self.config.sample_rate).round() as usize
    }
}
