//! Realtime-safe colored noise engine.
//!
//! A preset description is turned into a per-channel network of processing
//! nodes by [`program::ProgramBuilder`]. The resulting [`program::Program`] is
//! driven from the audio callback together with the stereo field transforms
//! in [`dsp::stereo`] and the play/pause envelope in [`ramp`].

pub mod dsp;
pub mod export; // Offline rendering to buffers and WAV files
pub mod graph; // Processing nodes and their serial/parallel composition
pub mod presets; // Ready-made preset descriptions
pub mod program; // Preset description → node graph
pub mod ramp; // Play/pause envelope

#[cfg(feature = "rtrb")]
pub mod engine; // Render/control split with lock-free program swaps

/// Longest run of frames a split node processes at once. Also the scratch
/// length used by the engine and the auto-gain pass.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Longest run of frames the ramper computes an envelope for at once.
pub const RAMP_BLOCK_SIZE: usize = 512;
