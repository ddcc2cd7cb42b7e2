//! TUI module for noisy
//!
//! Transport, spectrum and key handling. All engine control goes through
//! the [`EngineController`]; audio only arrives through the tap ring.

mod spectrum;
mod transport;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;
use tracing::warn;

use noisy_dsp::{dsp::stereo::StereoField, engine::EngineController, program::PresetDescription};

use spectrum::{render_spectrum, SpectrumAnalyzer};
use transport::{render_transport, AudioStats};

/// FFT length for the analyzer
pub const SPECTRUM_SIZE: usize = 2048;

const VOLUME_STEP: f32 = 0.05;
const WIDTH_STEP: f32 = 0.1;
const BALANCE_STEP: f32 = 0.1;

pub struct UiApp {
    controller: EngineController,
    presets: Vec<PresetDescription>,
    current: usize,
    audio_rx: Consumer<f32>,
    /// Most recent SPECTRUM_SIZE samples from the tap
    audio_buffer: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    /// Last error worth showing in the help bar
    status: Option<String>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        controller: EngineController,
        presets: Vec<PresetDescription>,
        current: usize,
        audio_rx: Consumer<f32>,
    ) -> Self {
        let sample_rate = controller.config().sample_rate as f32;
        Self {
            controller,
            presets,
            current,
            audio_rx,
            audio_buffer: vec![0.0; SPECTRUM_SIZE],
            analyzer: SpectrumAnalyzer::new(SPECTRUM_SIZE, sample_rate),
            status: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.controller.collect_garbage();

            terminal.draw(|frame| self.render(frame))?;

            // ~30fps is plenty for a noise spectrum
            if event::poll(Duration::from_millis(33))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.controller.pause();
        Ok(())
    }

    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }

        if received {
            if self.audio_buffer.len() > SPECTRUM_SIZE {
                let excess = self.audio_buffer.len() - SPECTRUM_SIZE;
                self.audio_buffer.drain(0..excess);
            }
            self.analyzer.update(&self.audio_buffer);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let field = self.controller.stereo_field();
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.controller.toggle(),
            KeyCode::Char('m') | KeyCode::Char('M') => {
                let muted = self.controller.is_muted();
                self.controller.set_muted(!muted);
            }
            KeyCode::Up => self.set_field(StereoField {
                volume: field.volume + VOLUME_STEP,
                ..field
            }),
            KeyCode::Down => self.set_field(StereoField {
                volume: field.volume - VOLUME_STEP,
                ..field
            }),
            KeyCode::Left => self.set_field(StereoField {
                balance: field.balance - BALANCE_STEP,
                ..field
            }),
            KeyCode::Right => self.set_field(StereoField {
                balance: field.balance + BALANCE_STEP,
                ..field
            }),
            KeyCode::Char('[') => self.set_field(StereoField {
                width: field.width - WIDTH_STEP,
                ..field
            }),
            KeyCode::Char(']') => self.set_field(StereoField {
                width: field.width + WIDTH_STEP,
                ..field
            }),
            KeyCode::Char('0') => self.set_field(StereoField::default()),
            KeyCode::Char('n') | KeyCode::Tab => self.select(self.current + 1),
            KeyCode::Char('p') | KeyCode::BackTab => {
                self.select(self.current + self.presets.len() - 1)
            }
            _ => {}
        }
    }

    fn set_field(&mut self, field: StereoField) {
        if let Err(err) = self.controller.set_stereo_field(field) {
            warn!(%err, "stereo field update dropped");
            self.status = Some(err.to_string());
        }
    }

    fn select(&mut self, index: usize) {
        let index = index % self.presets.len();
        match self.controller.build_program(&self.presets[index]) {
            Ok(()) => {
                self.current = index;
                self.status = None;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_transport(
            frame,
            chunks[0],
            &self.presets[self.current].name,
            &self.controller,
            &AudioStats::from_buffer(&self.audio_buffer),
        );

        render_spectrum(frame, chunks[1], self.analyzer.data());

        let help = match &self.status {
            Some(message) => Paragraph::new(format!(" {message}"))
                .style(Style::default().fg(Color::Red)),
            None => Paragraph::new(
                " [Q] Quit  [Space] Play/Pause  [M] Mute  [N/P] Preset  [↑/↓] Volume  [←/→] Balance  [ and ] Width  [0] Reset",
            )
            .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(help, chunks[2]);
    }
}
