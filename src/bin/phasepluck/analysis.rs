//! Level and pitch measurements on rendered audio

use rustfft::{num_complex::Complex, FftPlanner};

/// Lowest pitch the estimator searches for
const MIN_PITCH_HZ: f32 = 20.0;
/// Highest pitch the estimator searches for
const MAX_PITCH_HZ: f32 = 4_000.0;
/// Box smoothing length; nulls ringing at sample_rate / 2 and / 4
const SMOOTHING: usize = 4;
/// A candidate period must reach this fraction of the strongest correlation
const PEAK_THRESHOLD: f32 = 0.9;

/// Audio statistics for display
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
    /// NaN or infinite samples
    pub non_finite: usize,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self::default();
        }
        let non_finite = buffer.iter().filter(|x| !x.is_finite()).count();
        let finite = || buffer.iter().copied().filter(|x| x.is_finite());
        let peak = finite().fold(0.0f32, |acc, x| acc.max(x.abs()));
        let rms = (finite().map(|x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self {
            peak,
            rms,
            non_finite,
        }
    }
}

/// Estimate the fundamental frequency of `samples` from its autocorrelation.
///
/// The signal is box-smoothed first so near-Nyquist ringing (the pulse
/// oscillator's feedback saws produce some after every edge) cannot pass for
/// a very short period. The autocorrelation is computed with a zero-padded
/// FFT. The period is the first lag past the zero-lag lobe that comes within
/// `PEAK_THRESHOLD` of the strongest peak, refined by parabolic
/// interpolation. Returns `None` for silence or when no period fits in the
/// buffer.
pub fn estimate_fundamental(samples: &[f32], sample_rate: f32) -> Option<f32> {
    if samples.len() < 8 * SMOOTHING
        || !(sample_rate > 0.0)
        || samples.iter().any(|x| !x.is_finite())
    {
        return None;
    }

    let smoothed: Vec<f32> = samples
        .windows(SMOOTHING)
        .map(|w| w.iter().sum::<f32>() / SMOOTHING as f32)
        .collect();
    let n = smoothed.len();
    let mean = smoothed.iter().sum::<f32>() / n as f32;
    let size = (2 * n).next_power_of_two();
    let mut spectrum: Vec<Complex<f32>> = smoothed
        .iter()
        .map(|&x| Complex::new(x - mean, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(size)
        .collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(size).process(&mut spectrum);
    for bin in spectrum.iter_mut() {
        *bin = Complex::new(bin.norm_sqr(), 0.0);
    }
    planner.plan_fft_inverse(size).process(&mut spectrum);

    let acf: Vec<f32> = spectrum[..n].iter().map(|c| c.re).collect();
    if acf[0] <= f32::EPSILON {
        return None;
    }

    let max_lag = ((sample_rate / MIN_PITCH_HZ).ceil() as usize).min(n - 2);
    let min_lag = (sample_rate / MAX_PITCH_HZ) as usize;
    let start = acf.iter().position(|&v| v <= 0.0)?.max(min_lag).max(1);
    if start >= max_lag {
        return None;
    }

    let strongest = acf[start..=max_lag].iter().copied().fold(f32::MIN, f32::max);
    if strongest <= 0.0 {
        return None;
    }

    let mut lag = (start..=max_lag).find(|&i| acf[i] >= PEAK_THRESHOLD * strongest)?;
    while lag < max_lag && acf[lag + 1] > acf[lag] {
        lag += 1;
    }

    let (a, b, c) = (acf[lag - 1], acf[lag], acf[lag + 1]);
    let denom = a - 2.0 * b + c;
    let shift = if denom.abs() > f32::EPSILON {
        0.5 * (a - c) / denom
    } else {
        0.0
    };

    Some(sample_rate / (lag as f32 + shift))
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasepluck::{dsp::PulseOscillator, ParameterSnapshot};
    use std::f32::consts::TAU;

    #[test]
    fn test_stats() {
        let stats = AudioStats::from_buffer(&[0.5, -1.0, 0.5, f32::NAN]);
        assert_eq!(stats.peak, 1.0);
        assert_eq!(stats.non_finite, 1);
        assert!((stats.rms - (1.5f32 / 4.0).sqrt()).abs() < 1e-6);
        assert_eq!(AudioStats::from_buffer(&[]), AudioStats::default());
    }

    #[test]
    fn test_sine_pitch() {
        let sample_rate = 48_000.0;
        let samples: Vec<f32> = (0..4_800)
            .map(|i| (TAU * 440.0 * i as f32 / sample_rate).sin())
            .collect();
        let hz = estimate_fundamental(&samples, sample_rate).unwrap();
        assert!((hz - 440.0).abs() < 1.0, "{hz}");
    }

    #[test]
    fn test_pulse_pitch() {
        let sample_rate = 48_000.0;
        let mut osc = PulseOscillator::new();
        let mut samples = vec![0.0f32; 9_600];
        let params = ParameterSnapshot {
            frequency: 330.0,
            ..ParameterSnapshot::default()
        };
        osc.render(&mut samples, &params, sample_rate);
        let hz = estimate_fundamental(&samples, sample_rate).unwrap();
        assert!((hz - 330.0).abs() < 2.0, "{hz}");
    }

    #[test]
    fn test_silence_has_no_pitch() {
        assert_eq!(estimate_fundamental(&[0.0; 1_024], 48_000.0), None);
        assert_eq!(estimate_fundamental(&[1.0; 16], 48_000.0), None);
    }
}
