//! Transport bar widget - preset, play state, stereo field and levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use noisy_dsp::{dsp::amplify::amplitude_to_db, engine::EngineController};

pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    preset: &str,
    controller: &EngineController,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" noisy ").borders(Borders::ALL);

    let playing = controller.is_playing();
    let (symbol, state, color) = match (playing, controller.is_muted()) {
        (true, false) => ("▶", "Playing", Color::Green),
        (true, true) => ("▶", "Muted", Color::Red),
        (false, _) => ("⏸", "Paused", Color::Yellow),
    };
    let field = controller.stereo_field();
    let sample_rate_khz = controller.config().sample_rate / 1000.0;

    let line = Line::from(vec![
        Span::styled(format!(" {preset}  "), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("{symbol} {state}  "),
            Style::default().fg(color),
        ),
        Span::styled(
            format!(
                "Vol {:>3.0}%  Width {:+.1}  Bal {:+.1}  ",
                field.volume * 100.0,
                field.width,
                field.balance
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{sample_rate_khz:.1}kHz  "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!(
                "Peak: {:.1} dB  RMS: {:.1} dB",
                amplitude_to_db(audio_stats.peak as f64),
                amplitude_to_db(audio_stats.rms as f64)
            ),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
