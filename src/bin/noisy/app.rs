//! Noisy - audio setup and runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use tracing::{error, info};

use noisy_dsp::{
    engine::{Engine, EngineConfig},
    program::PresetDescription,
};

use super::ui::{UiApp, SPECTRUM_SIZE};

/// Samples buffered between the audio callback and the analyzer.
const TAP_SIZE: usize = SPECTRUM_SIZE * 8;

pub struct Noisy {
    presets: Vec<PresetDescription>,
    start: usize,
}

impl Noisy {
    pub fn new(presets: Vec<PresetDescription>) -> Self {
        Self { presets, start: 0 }
    }

    /// Preset loaded on startup (index into the preset list).
    pub fn start_at(mut self, index: usize) -> Self {
        self.start = index;
        self
    }

    /// Open the default output device and hand the terminal to the UI.
    pub fn run(self) -> EyreResult<()> {
        if self.presets.is_empty() {
            return Err(eyre!("no presets to play"));
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;
        info!(sample_rate, channels, "opened output device");

        let (mut engine, mut controller) = Engine::new(EngineConfig {
            sample_rate,
            channel_count: channels.min(2),
            ..EngineConfig::default()
        });

        let start = self.start.min(self.presets.len() - 1);
        controller
            .build_program(&self.presets[start])
            .wrap_err_with(|| format!("failed to load preset '{}'", self.presets[start].name))?;

        // Left channel tap for the spectrum view
        let (mut tap_tx, tap_rx) = RingBuffer::<f32>::new(TAP_SIZE);

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                engine.process_interleaved(data, channels);
                for frame in data.chunks_exact(channels) {
                    if tap_tx.push(frame[0]).is_err() {
                        break;
                    }
                }
            },
            |err| error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;
        controller.play();

        let mut terminal = ratatui::init();
        let result = UiApp::new(controller, self.presets, start, tap_rx).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}
