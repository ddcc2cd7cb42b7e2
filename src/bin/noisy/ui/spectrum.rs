//! Spectrum analyzer widget
//!
//! Noise spectra are ragged frame to frame, so each displayed band averages
//! every FFT bin it covers and is smoothed over time.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::{ops::Range, sync::Arc};

/// Number of log-spaced bands on screen
const SPECTRUM_BANDS: usize = 64;
/// Weight of the previous frame in the time smoothing
const SMOOTHING: f64 = 0.8;
const FLOOR_DB: f64 = -100.0;
const LOWEST_HZ: f64 = 20.0;

pub struct SpectrumAnalyzer {
    /// Hann window
    window: Vec<f32>,
    /// FFT bins covered by each band
    bands: Vec<Range<usize>>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 of band centre in Hz, level in dB)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_len);

        let window = (0..fft_len)
            .map(|i| {
                if fft_len > 1 {
                    let phase = 2.0 * std::f32::consts::PI * i as f32 / (fft_len - 1) as f32;
                    0.5 * (1.0 - phase.cos())
                } else {
                    1.0
                }
            })
            .collect();

        let sample_rate = sample_rate.max(1.0) as f64;
        let nyquist = (sample_rate / 2.0).min(20_000.0).max(LOWEST_HZ * 2.0);
        let half = (fft_len / 2).max(1);
        let hz_to_bin = |hz: f64| ((hz * fft_len as f64 / sample_rate) as usize).min(half - 1);
        let ratio = nyquist / LOWEST_HZ;

        let mut bands = Vec::with_capacity(SPECTRUM_BANDS);
        let mut spectrum = Vec::with_capacity(SPECTRUM_BANDS);
        for band in 0..SPECTRUM_BANDS {
            let lo = LOWEST_HZ * ratio.powf(band as f64 / SPECTRUM_BANDS as f64);
            let hi = LOWEST_HZ * ratio.powf((band + 1) as f64 / SPECTRUM_BANDS as f64);
            let start = hz_to_bin(lo).max(1);
            let end = hz_to_bin(hi).max(start) + 1;
            bands.push(start..end);
            spectrum.push(((lo * hi).sqrt().log10(), FLOOR_DB));
        }

        Self {
            window,
            bands,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            spectrum,
        }
    }

    /// Fold a new window of samples into the display. Ignored unless
    /// `buffer` is exactly one FFT long.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let norm = 1.0 / (self.window.len() as f64).powi(2);
        for (range, (_, level)) in self.bands.iter().zip(self.spectrum.iter_mut()) {
            let bins = &self.scratch[range.clone()];
            let power = bins.iter().map(|c| c.norm_sqr() as f64).sum::<f64>() / bins.len() as f64;
            let db = (10.0 * (power * norm).max(1e-12).log10()).max(FLOOR_DB);
            *level = SMOOTHING * *level + (1.0 - SMOOTHING) * db;
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([LOWEST_HZ.log10(), 20_000f64.log10()])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
