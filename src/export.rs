//! Offline rendering of a preset into interleaved samples or a WAV file.
//!
//! [`OfflineRender`] runs the same chain as the realtime engine (program,
//! output stage, ramper) block by block, with a fade-in at the start and a
//! fade-out that ends exactly on the last frame. Nothing here needs a
//! device or a second thread.

use std::{
    io::{Seek, Write},
    path::Path,
};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::stereo::StereoField,
    program::{BuildError, BuildOptions, PresetDescription, Program, ProgramBuilder},
    ramp::Ramper,
    MAX_BLOCK_SIZE,
};

/// Largest data chunk a RIFF header can describe, less room for the header.
const MAX_WAV_DATA_BYTES: u64 = u32::MAX as u64 - 1024;

/// What to render and how long.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSettings {
    pub sample_rate: f64,
    /// 1 or 2. Also the channel count of the written file.
    pub channel_count: usize,
    /// Length of the render in seconds.
    pub duration: f64,
    pub fade_in: f64,
    /// Seconds of fade-out ending on the last frame. When it overlaps the
    /// fade-in, it starts from whatever level the fade-in reached.
    pub fade_out: f64,
    pub stereo: StereoField,
    pub auto_gain: bool,
    pub build: BuildOptions,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            channel_count: 2,
            duration: 60.0,
            fade_in: 0.5,
            fade_out: 0.5,
            stereo: StereoField::default(),
            auto_gain: true,
            build: BuildOptions::default(),
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    /// A duration or fade length is negative or not finite
    InvalidTime { name: &'static str, value: f64 },
    /// The render would not fit in a WAV file
    TooLong { frames: usize, limit: usize },
    /// The preset did not build
    Build(BuildError),
    /// Writing the WAV data failed
    Wav(hound::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::InvalidTime { name, value } => {
                write!(f, "{name} must be a finite, non-negative number of seconds, got {value}")
            }
            ExportError::TooLong { frames, limit } => {
                write!(f, "{frames} frames do not fit in a WAV file (limit {limit})")
            }
            ExportError::Build(err) => write!(f, "preset failed to build: {err}"),
            ExportError::Wav(err) => write!(f, "could not write WAV data: {err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Build(err) => Some(err),
            ExportError::Wav(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BuildError> for ExportError {
    fn from(err: BuildError) -> Self {
        ExportError::Build(err)
    }
}

impl From<hound::Error> for ExportError {
    fn from(err: hound::Error) -> Self {
        ExportError::Wav(err)
    }
}

/// A preset rendered block by block into interleaved samples.
pub struct OfflineRender {
    program: Program,
    stereo: StereoField,
    ramper: Ramper,
    total_frames: usize,
    position: usize,
    fade_out_start: usize,
    fade_out_frames: usize,
    left: Vec<f32>,
    right: Vec<f32>,
    interleaved: Vec<f32>,
}

impl OfflineRender {
    pub fn new(preset: &PresetDescription, settings: &ExportSettings) -> Result<Self, ExportError> {
        for (name, value) in [
            ("duration", settings.duration),
            ("fade_in", settings.fade_in),
            ("fade_out", settings.fade_out),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ExportError::InvalidTime { name, value });
            }
        }

        let program = ProgramBuilder::new(preset, settings.channel_count, settings.sample_rate)
            .for_auto_gain(settings.auto_gain)
            .options(settings.build)
            .build()?;

        let to_frames = |seconds: f64| (seconds * settings.sample_rate).round() as usize;
        let total_frames = to_frames(settings.duration);
        let fade_out_frames = to_frames(settings.fade_out).min(total_frames);

        let ramper = Ramper::new();
        ramper.update(true, to_frames(settings.fade_in));

        Ok(Self {
            stereo: settings.stereo,
            ramper,
            total_frames,
            position: 0,
            fade_out_start: total_frames - fade_out_frames,
            fade_out_frames,
            left: vec![0.0; MAX_BLOCK_SIZE],
            right: vec![0.0; MAX_BLOCK_SIZE],
            interleaved: Vec::with_capacity(MAX_BLOCK_SIZE * program.channel_count()),
            program,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.program.channel_count()
    }

    pub fn sample_rate(&self) -> f64 {
        self.program.sample_rate()
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn remaining_frames(&self) -> usize {
        self.total_frames - self.position
    }

    /// Render the next block, at most [`MAX_BLOCK_SIZE`] frames, as
    /// interleaved samples. `None` once every frame has been produced.
    pub fn next_block(&mut self) -> Option<&[f32]> {
        if self.position >= self.total_frames {
            return None;
        }

        if self.position == self.fade_out_start && self.fade_out_frames > 0 {
            self.ramper.update(false, self.fade_out_frames);
        }

        // Blocks stop at the fade-out boundary so it starts on time.
        let mut frames = self.remaining_frames().min(MAX_BLOCK_SIZE);
        if self.position < self.fade_out_start {
            frames = frames.min(self.fade_out_start - self.position);
        }

        let left = &mut self.left[..frames];
        let right = &mut self.right[..frames];
        self.interleaved.clear();

        if self.program.channel_count() == 2 {
            self.program.render(&self.stereo, left, Some(&mut *right));
            self.ramper.process(left, Some(&mut *right));
            for (l, r) in left.iter().zip(right.iter()) {
                self.interleaved.push(*l);
                self.interleaved.push(*r);
            }
        } else {
            self.program.render(&self.stereo, left, None);
            self.ramper.process(left, None);
            self.interleaved.extend_from_slice(left);
        }

        self.position += frames;
        Some(&self.interleaved)
    }

    fn wav_spec(&self) -> Result<WavSpec, ExportError> {
        let bytes_per_frame = self.channel_count() as u64 * 4;
        let limit = (MAX_WAV_DATA_BYTES / bytes_per_frame) as usize;
        if self.total_frames > limit {
            return Err(ExportError::TooLong {
                frames: self.total_frames,
                limit,
            });
        }

        Ok(WavSpec {
            channels: self.channel_count() as u16,
            sample_rate: self.sample_rate().round() as u32,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        })
    }
}

/// Render a whole preset into one interleaved buffer.
pub fn render(preset: &PresetDescription, settings: &ExportSettings) -> Result<Vec<f32>, ExportError> {
    let mut render = OfflineRender::new(preset, settings)?;
    let mut samples = Vec::with_capacity(render.total_frames() * render.channel_count());
    while let Some(block) = render.next_block() {
        samples.extend_from_slice(block);
    }
    Ok(samples)
}

/// Stream a render into `writer` as 32-bit float WAV. Returns the number of
/// frames written.
pub fn write_wav<W: Write + Seek>(
    writer: W,
    preset: &PresetDescription,
    settings: &ExportSettings,
) -> Result<usize, ExportError> {
    let render = OfflineRender::new(preset, settings)?;
    let writer = WavWriter::new(writer, render.wav_spec()?)?;
    write_samples(writer, render)
}

/// [`write_wav`] into a new file at `path`. The file is only created once
/// the preset has built.
pub fn export_wav<P: AsRef<Path>>(
    path: P,
    preset: &PresetDescription,
    settings: &ExportSettings,
) -> Result<usize, ExportError> {
    let path = path.as_ref();
    let render = OfflineRender::new(preset, settings)?;
    let writer = WavWriter::create(path, render.wav_spec()?)?;
    let frames = write_samples(writer, render)?;

    info!(preset = %preset.name, path = %path.display(), frames, "exported");
    Ok(frames)
}

fn write_samples<W: Write + Seek>(
    mut writer: WavWriter<W>,
    mut render: OfflineRender,
) -> Result<usize, ExportError> {
    let frames = render.total_frames();
    while let Some(block) = render.next_block() {
        for &sample in block {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()?;
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        presets,
        program::{NodeDescription, PresetDescription},
    };
    use std::io::Cursor;

    fn settings(duration: f64) -> ExportSettings {
        ExportSettings {
            duration,
            fade_in: 0.0,
            fade_out: 0.0,
            auto_gain: false,
            build: BuildOptions {
                seed: Some(99),
                ..BuildOptions::default()
            },
            ..ExportSettings::default()
        }
    }

    fn rms(buffer: &[f32]) -> f32 {
        (buffer.iter().map(|s| s * s).sum::<f32>() / buffer.len() as f32).sqrt()
    }

    #[test]
    fn test_render_length_and_layout() {
        let samples = render(&presets::pink(), &settings(0.25)).unwrap();
        assert_eq!(samples.len(), 12_000 * 2);
        assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 1.0));

        let left: Vec<f32> = samples.iter().step_by(2).copied().collect();
        let right: Vec<f32> = samples.iter().skip(1).step_by(2).copied().collect();
        assert!(rms(&left) > 1e-3 && rms(&right) > 1e-3);
        assert_ne!(left, right, "stereo presets get independent noise per side");
    }

    #[test]
    fn test_mono_render() {
        let mut settings = settings(0.1);
        settings.channel_count = 1;

        let samples = render(&presets::white(), &settings).unwrap();
        assert_eq!(samples.len(), 4_800);
        assert!(rms(&samples) > 1e-3);
    }

    #[test]
    fn test_same_seed_renders_identically() {
        let first = render(&presets::brown(), &settings(0.1)).unwrap();
        let second = render(&presets::brown(), &settings(0.1)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fades_start_and_end_silent() {
        let mut settings = settings(1.0);
        settings.channel_count = 1;
        settings.fade_in = 0.25;
        settings.fade_out = 0.25;

        let samples = render(&presets::white(), &settings).unwrap();
        assert_eq!(samples.len(), 48_000);

        let start = rms(&samples[..480]);
        let middle = rms(&samples[20_000..28_000]);
        let end = rms(&samples[48_000 - 480..]);
        assert!(start < middle * 0.1, "start {start} vs middle {middle}");
        assert!(end < middle * 0.1, "end {end} vs middle {middle}");
        assert!(samples[47_999].abs() < 1e-3);
    }

    #[test]
    fn test_zero_duration_is_empty() {
        let samples = render(&presets::white(), &settings(0.0)).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_invalid_times_are_rejected() {
        let mut bad = settings(1.0);
        bad.fade_out = -1.0;
        assert!(matches!(
            render(&presets::white(), &bad),
            Err(ExportError::InvalidTime { name: "fade_out", .. })
        ));

        bad = settings(f64::NAN);
        assert!(matches!(
            render(&presets::white(), &bad),
            Err(ExportError::InvalidTime { name: "duration", .. })
        ));
    }

    #[test]
    fn test_build_errors_pass_through() {
        let broken = PresetDescription::new("broken", vec![NodeDescription::new("nonsense")]);
        let err = render(&broken, &settings(1.0)).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Build(BuildError::UnknownNodeType { .. })
        ));
    }

    #[test]
    fn test_wav_matches_render() {
        let settings = settings(0.2);
        let expected = render(&presets::waterfall(), &settings).unwrap();

        let mut file = Cursor::new(Vec::new());
        let frames = write_wav(&mut file, &presets::waterfall(), &settings).unwrap();
        assert_eq!(frames, 9_600);

        file.set_position(0);
        let mut reader = hound::WavReader::new(file).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 48_000);
        assert_eq!(spec.sample_format, SampleFormat::Float);

        let written: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(written, expected);
    }

    #[test]
    fn test_overlong_export_writes_nothing() {
        let mut file = Cursor::new(Vec::new());
        let err = write_wav(&mut file, &presets::white(), &settings(10.0 * 3600.0)).unwrap_err();
        assert!(matches!(err, ExportError::TooLong { .. }));
        assert!(file.get_ref().is_empty());
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join(format!("noisy_export_{}.wav", std::process::id()));
        let frames = export_wav(&path, &presets::pink(), &settings(0.05)).unwrap();
        assert_eq!(frames, 2_400);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len() as usize, 2_400 * 2);
        std::fs::remove_file(&path).unwrap();
    }
}
