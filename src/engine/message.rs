use crate::{dsp::stereo::StereoField, program::Program};

/// Control → render requests.
#[derive(Debug)]
pub enum EngineMessage {
    /// Replace the active program. The old one is sent back for dropping.
    LoadProgram(Box<Program>),
    /// Drop back to silence. The old program is sent back for dropping.
    ClearProgram,
    SetStereoField(StereoField),
}
