use rand_core::SeedableRng;

use crate::{
    dsp::{
        amplify::db_to_amplitude,
        noise::{fill_uniform, Xoshiro256StarStar},
    },
    program::{description::AutoGainSettings, Program},
    MAX_BLOCK_SIZE,
};

/*
Auto-Gain Calibration
=====================

Presets differ wildly in level: a deep brown rumble and a bright hiss built
from the same generator can sit 20 dB apart. Rather than asking preset
authors to balance them by ear, the builder renders a throwaway copy of the
graph offline and measures it.

  1. Build a twin of the program (same seeds, fresh state).
  2. Feed every block unit-amplitude uniform noise from a fixed seed, so
     filter-only presets have something to color.
  3. Render `sample_count` frames in MAX_BLOCK_SIZE blocks.
  4. Ignore the first eighth while filters and integrators settle.
  5. Measure peak and RMS per channel.

The gain that lands the RMS on the target level is

    scalar = 10^(level_db / 20) / rms

clamped to ±40 dB. Unless the preset asks for separate channels, both
channels share the scalar computed from their combined RMS, which keeps the
stereo image intact. Silence or a non-finite measurement yields 1.0.
*/

const CALIBRATION_SEED: u64 = 0x6e6f_6973_795f_6361;
const MAX_CORRECTION_DB: f64 = 40.0;

/// Raw calibration result for up to two channels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurement {
    pub channel_count: usize,
    pub frames: usize,
    pub peak: [f32; 2],
    pub sum_of_squares: [f64; 2],
}

impl Measurement {
    pub fn rms(&self, channel: usize) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        (self.sum_of_squares[channel] / self.frames as f64).sqrt()
    }

    /// RMS over every measured channel together.
    pub fn combined_rms(&self) -> f64 {
        let channels = self.channel_count.clamp(1, 2);
        if self.frames == 0 {
            return 0.0;
        }
        let total: f64 = self.sum_of_squares[..channels].iter().sum();
        (total / (self.frames * channels) as f64).sqrt()
    }
}

/// Render `sample_count` frames of calibration signal through `program`.
pub fn measure(program: &mut Program, sample_count: usize) -> Measurement {
    let channel_count = program.channel_count();
    let settle = sample_count / 8;

    let mut rng = Xoshiro256StarStar::seed_from_u64(CALIBRATION_SEED);
    let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

    let mut measurement = Measurement {
        channel_count,
        ..Measurement::default()
    };

    let mut position = 0;
    while position < sample_count {
        let frames = (sample_count - position).min(MAX_BLOCK_SIZE);
        let left = &mut left[..frames];
        let right = &mut right[..frames];

        fill_uniform(&mut rng, left);
        if channel_count == 2 {
            fill_uniform(&mut rng, right);
            program.process(left, Some(&mut *right));
        } else {
            program.process(left, None);
        }

        let skip = settle.saturating_sub(position).min(frames);
        accumulate(&mut measurement, 0, &left[skip..]);
        if channel_count == 2 {
            accumulate(&mut measurement, 1, &right[skip..]);
        }
        measurement.frames += frames - skip;

        position += frames;
    }

    measurement
}

fn accumulate(measurement: &mut Measurement, channel: usize, samples: &[f32]) {
    for &sample in samples {
        measurement.peak[channel] = measurement.peak[channel].max(sample.abs());
        measurement.sum_of_squares[channel] += (sample as f64) * (sample as f64);
    }
}

/// Turn a measurement into per-channel gain scalars.
pub fn scalars(measurement: &Measurement, settings: &AutoGainSettings) -> (f32, f32) {
    let target = db_to_amplitude(settings.level_db);

    if measurement.channel_count < 2 {
        let left = correction(target, measurement.rms(0));
        return (left, left);
    }

    if settings.separate {
        (
            correction(target, measurement.rms(0)),
            correction(target, measurement.rms(1)),
        )
    } else {
        let both = correction(target, measurement.combined_rms());
        (both, both)
    }
}

fn correction(target: f64, rms: f64) -> f32 {
    if !target.is_finite() || !rms.is_finite() || rms <= 0.0 {
        return 1.0;
    }

    let limit = db_to_amplitude(MAX_CORRECTION_DB);
    (target / rms).clamp(1.0 / limit, limit) as f32
}
