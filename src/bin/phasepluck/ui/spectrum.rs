//! Spectrum analyzer widget
//!
//! Hann-windowed FFT magnitudes sampled at log-spaced frequencies and drawn
//! against log10(Hz), so every octave gets the same width.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of frequency points to display
const SPECTRUM_POINTS: usize = 96;
const LOW_HZ: f32 = 20.0;
const HIGH_HZ: f32 = 20_000.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    /// Hann window coefficients
    window: Vec<f32>,
    /// FFT bin for each display point
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 Hz, dB) per display point
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `fft_size` must match the length of the buffers passed to `update`.
    pub fn new(fft_size: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        let denom = fft_size.saturating_sub(1).max(1) as f32;
        let window = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let high = HIGH_HZ.min(sample_rate / 2.0).max(LOW_HZ);
        let last_bin = (fft_size / 2).saturating_sub(1);
        let (bin_indices, spectrum) = (0..SPECTRUM_POINTS)
            .map(|i| {
                let t = i as f32 / (SPECTRUM_POINTS - 1) as f32;
                let hz = LOW_HZ * (high / LOW_HZ).powf(t);
                let bin = ((hz * fft_size as f32 / sample_rate).round() as usize).min(last_bin);
                (bin, ((hz as f64).log10(), FLOOR_DB))
            })
            .unzip();

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            spectrum,
        }
    }

    /// Recompute the spectrum. Buffers of the wrong length are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(if sample.is_finite() { sample * w } else { 0.0 }, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Hann coherent gain is 0.5: an on-bin full-scale sine reads 0 dB
        let n = self.scratch.len() as f32;
        let scale = 16.0 / (n * n);
        for (point, &bin) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let power = (self.scratch[bin].norm_sqr() * scale).max(1e-12);
            point.1 = (10.0 * (power as f64).log10()).max(FLOOR_DB);
        }
    }

    /// (log10 Hz, dB) pairs
    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

/// Render the spectrum, with a marker at the estimated pitch
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)], pitch: Option<f32>) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let marker: Vec<(f64, f64)> = pitch
        .map(|hz| {
            let x = (hz as f64).log10();
            vec![(x, FLOOR_DB), (x, 0.0)]
        })
        .unwrap_or_default();

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(spectrum),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&marker),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([(LOW_HZ as f64).log10(), (HIGH_HZ as f64).log10()])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 10.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_peaks_at_its_frequency() {
        let sample_rate = 48_000.0;
        let size = 2_048;
        let mut analyzer = SpectrumAnalyzer::new(size, sample_rate);

        // A sine centered on the bin of one display point
        let bin = analyzer.bin_indices[60];
        let hz = bin as f32 * sample_rate / size as f32;
        let buffer: Vec<f32> = (0..size)
            .map(|i| (std::f32::consts::TAU * hz * i as f32 / sample_rate).sin())
            .collect();
        analyzer.update(&buffer);

        let (x, db) = analyzer
            .data()
            .iter()
            .copied()
            .fold((0.0, f64::MIN), |best, p| if p.1 > best.1 { p } else { best });
        let peak_hz = 10f64.powf(x) as f32;
        assert!((peak_hz / hz - 1.0).abs() < 0.1, "{peak_hz} vs {hz}");
        assert!(db.abs() < 0.5, "{db}");
    }

    #[test]
    fn test_wrong_length_is_ignored() {
        let mut analyzer = SpectrumAnalyzer::new(256, 48_000.0);
        analyzer.update(&[1.0; 100]);
        assert!(analyzer.data().iter().all(|&(_, db)| db == FLOOR_DB));
    }
}
