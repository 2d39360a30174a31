use crate::dsp::{math::sine01, phasor::Phasor};
use crate::params::ParameterSnapshot;

/*
Phase-Distortion Pulse Oscillator
=================================

A naive pulse wave (`if phase < width { 1 } else { -1 }`) jumps between two
levels in zero time. That jump has infinitely many harmonics, and everything
above Nyquist folds back down as inharmonic aliasing. This oscillator builds
the pulse from two sawtooths that are band-limited to begin with.

Vocabulary
----------

  w              Normalized frequency: frequency / sample_rate. Audible,
                 alias-free content lives in (0, 0.5).

  self-feedback  The previous output is added back onto the phase before the
                 sine lookup. This bends (phase-distorts) the sine so that it
                 spends longer rising than falling: a sawtooth shape whose
                 harmonics roll off smoothly instead of running past Nyquist.

  leaky          out = (sine + previous_out) * 0.5. Averaging with the last
  integrator     output smooths the distorted sine into a band-limited saw.

  scaling        How much of the previous output is fed back. More feedback
                 means a sharper saw with more harmonics.

  norm           Amplitude correction for the integrator, which loses level as
                 the frequency rises.


Signal Flow
-----------

    phasor ─┬──────────────────► [saw A] ──────┐
            │                                  (A − B) ─► [HF comp] ─► × norm × gain
            └─► (+ pulse width, wrap) ─► [saw B] ┘

    saw X:  feedback = phase + history × scaling
            saw      = feedback − floor(feedback)
            out      = (sine(saw) + history) × 0.5
            history  = out

Subtracting two identical sawtooths offset by `pulse_width` cycles leaves a
pulse whose duty cycle equals the offset. At 0.5 the two saws are exactly half
a cycle apart and the result is a symmetric square.


Stability Near Nyquist
----------------------

    scaling = 13 × max(0, 0.5 − w)⁴

    w       scaling
    0.00    0.8125     full feedback, sharpest saw
    0.10    0.3328
    0.25    0.0508
    0.50    0.0        no feedback at Nyquist

The fourth power rolls the feedback off smoothly as the pitch climbs, which
keeps the loop from ringing at high notes. The clamp matters: without it
(0.5 − w) goes negative above Nyquist and an even power turns positive again,
re-enabling feedback exactly where it is least stable.

The saw wrap uses floor() rather than the phasor's single subtraction because
the feedback term can push the sum below 0 or past 2.


High-Frequency Compensation
---------------------------

    filtered = 2.5 × raw − 1.5 × previous_raw

This is a two-tap FIR (zeros only, no feedback): DC passes at unity
(2.5 − 1.5 = 1) while content near Nyquist is boosted by up to 4×, undoing
the treble loss of the two leaky integrators. The delayed tap is the raw
pulse, not the filtered output.
*/

/// Feedback amount at w = 0 is `SCALING_GAIN × 0.5⁴`.
const SCALING_GAIN: f32 = 13.0;
/// Current-sample tap of the HF compensation filter.
pub const HF_COMP_A0: f32 = 2.5;
/// Previous-sample tap of the HF compensation filter.
pub const HF_COMP_A1: f32 = -1.5;

/// Per-block coefficients derived from the normalized frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseCoefficients {
    /// Self-feedback amount for both saws
    pub scaling: f32,
    /// Output normalization for integrator loss
    pub norm: f32,
}

impl PulseCoefficients {
    /// Derive coefficients for normalized frequency `w` (Hz / sample rate).
    pub fn for_normalized(w: f32) -> Self {
        let n = (0.5 - w).max(0.0);
        Self {
            scaling: SCALING_GAIN * n * n * n * n,
            norm: 1.0 - 2.0 * w,
        }
    }
}

impl Default for PulseCoefficients {
    fn default() -> Self {
        Self::for_normalized(0.0)
    }
}

/// Feedback memory of the pulse oscillator.
///
/// `step` is a pure function of this state, so the recurrence can be driven
/// sample-by-sample in tests without an oscillator or an audio stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PulseState {
    /// Last output of saw A
    pub osc1_history: f32,
    /// Last output of saw B (the pulse-width offset one)
    pub osc2_history: f32,
    /// Last raw pulse sample, delayed tap of the HF filter
    pub filter_history: f32,
}

impl PulseState {
    /// Advance the recurrence by one sample.
    ///
    /// `phase` must be in [0, 1) and `pulse_width` in [0, 1]. Returns the new
    /// state and the normalized sample (before gain).
    #[inline]
    pub fn step(self, phase: f32, pulse_width: f32, coeffs: &PulseCoefficients) -> (Self, f32) {
        let out1 = feedback_saw(phase, self.osc1_history, coeffs.scaling);

        let mut phase2 = phase + pulse_width;
        if phase2 >= 1.0 {
            phase2 -= 1.0;
        }
        let out2 = feedback_saw(phase2, self.osc2_history, coeffs.scaling);

        let raw_pulse = out1 - out2;
        let filtered = HF_COMP_A0 * raw_pulse + HF_COMP_A1 * self.filter_history;

        let next = Self {
            osc1_history: out1,
            osc2_history: out2,
            filter_history: raw_pulse,
        };
        (next, filtered * coeffs.norm)
    }
}

/// One self-modulating saw: phase-distorted sine through a leaky integrator.
#[inline]
fn feedback_saw(phase: f32, history: f32, scaling: f32) -> f32 {
    let feedback = phase + history * scaling;
    let saw = feedback - feedback.floor();
    (sine01(saw) + history) * 0.5
}

/// Band-limited pulse oscillator with pulse-width control.
#[derive(Debug, Clone, Default)]
pub struct PulseOscillator {
    phasor: Phasor,
    state: PulseState,
    coeffs: PulseCoefficients,
    normalized_frequency: f32,
}

impl PulseOscillator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retune the phasor and recompute the per-block coefficients.
    ///
    /// A non-positive sample rate yields w = 0 and a stalled phasor.
    /// Frequencies above Nyquist are held at Nyquist, where the saws lose
    /// their feedback.
    pub fn set_frequency(&mut self, hertz: f32, sample_rate: f32) {
        let nyquist = 0.5 * sample_rate;
        let hertz = if sample_rate > 0.0 && hertz > nyquist {
            nyquist
        } else {
            hertz
        };
        self.phasor.set_frequency(hertz, sample_rate);
        let w = self.phasor.increment();
        if w != self.normalized_frequency {
            self.normalized_frequency = w;
            self.coeffs = PulseCoefficients::for_normalized(w);
        }
    }

    /// Produce one output sample.
    #[inline]
    pub fn next_sample(&mut self, pulse_width: f32, gain: f32) -> f32 {
        let phase = self.phasor.next_sample();
        let (state, sample) = self.state.step(phase, pulse_width, &self.coeffs);
        self.state = state;
        sample * gain
    }

    /// Render a block with parameters held constant for its duration.
    pub fn render(&mut self, buffer: &mut [f32], params: &ParameterSnapshot, sample_rate: f32) {
        self.set_frequency(params.frequency, sample_rate);
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(params.pulse_width, params.gain);
        }
    }

    /// Zero the feedback histories and the phasor (stream restart).
    pub fn reset(&mut self) {
        self.state = PulseState::default();
        self.phasor.reset();
        self.normalized_frequency = 0.0;
        self.coeffs = PulseCoefficients::for_normalized(0.0);
    }

    pub fn state(&self) -> PulseState {
        self.state
    }

    pub fn coefficients(&self) -> PulseCoefficients {
        self.coeffs
    }

    pub fn normalized_frequency(&self) -> f32 {
        self.normalized_frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_seconds(hertz: f32, pulse_width: f32, sample_rate: f32, seconds: f32) -> Vec<f32> {
        let params = ParameterSnapshot {
            frequency: hertz,
            pulse_width,
            gain: 1.0,
            ..ParameterSnapshot::default()
        };
        let mut osc = PulseOscillator::new();
        let mut buffer = vec![0.0f32; (sample_rate * seconds) as usize];
        osc.render(&mut buffer, &params, sample_rate);
        buffer
    }

    #[test]
    fn test_scaling_limits() {
        let low = PulseCoefficients::for_normalized(0.0);
        assert!((low.scaling - 0.8125).abs() < 1e-6);
        assert!((low.norm - 1.0).abs() < 1e-6);

        let nyquist = PulseCoefficients::for_normalized(0.5);
        assert_eq!(nyquist.scaling, 0.0);
        assert!(nyquist.norm.abs() < 1e-6);

        let near = PulseCoefficients::for_normalized(0.49);
        assert!(near.scaling < 1e-6);
    }

    #[test]
    fn test_scaling_clamped_above_nyquist() {
        for w in [0.5, 0.6, 0.75, 0.99] {
            assert_eq!(PulseCoefficients::for_normalized(w).scaling, 0.0, "w = {w}");
        }
    }

    #[test]
    fn test_scaling_falls_monotonically() {
        let mut previous = f32::MAX;
        for i in 0..=50 {
            let scaling = PulseCoefficients::for_normalized(i as f32 / 100.0).scaling;
            assert!(scaling <= previous);
            previous = scaling;
        }
    }

    #[test]
    fn test_hf_filter_passes_dc_at_unity() {
        assert!((HF_COMP_A0 + HF_COMP_A1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_uses_raw_pulse_as_filter_tap() {
        let coeffs = PulseCoefficients::for_normalized(0.01);
        let state = PulseState {
            osc1_history: 0.3,
            osc2_history: -0.2,
            filter_history: 0.7,
        };
        let (next, sample) = state.step(0.1, 0.5, &coeffs);

        let raw = next.osc1_history - next.osc2_history;
        assert_eq!(next.filter_history, raw);
        let expected = (HF_COMP_A0 * raw + HF_COMP_A1 * 0.7) * coeffs.norm;
        assert!((sample - expected).abs() < 1e-6);
    }

    #[test]
    fn test_output_bounded_and_finite() {
        let sample_rate = 48_000.0;
        for hertz in [20.0, 110.0, 440.0, 2_000.0, 8_000.0, 16_000.0, 20_000.0] {
            let buffer = render_seconds(hertz, 0.5, sample_rate, 0.5);
            let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
            assert!(buffer.iter().all(|s| s.is_finite()), "{hertz} Hz");
            assert!(peak < 2.6, "{hertz} Hz peaked at {peak}");
            assert!(peak > 0.1, "{hertz} Hz is silent");
        }
    }

    #[test]
    fn test_half_width_saws_are_half_cycle_apart() {
        // 480 Hz at 48 kHz: exactly 100 samples per cycle
        let coeffs = PulseCoefficients::for_normalized(0.01);
        let mut phasor = Phasor::new(480.0, 48_000.0);
        let mut state = PulseState::default();
        let mut saw_a = Vec::with_capacity(4_800);
        let mut saw_b = Vec::with_capacity(4_800);
        for _ in 0..4_800 {
            let (next, _) = state.step(phasor.next_sample(), 0.5, &coeffs);
            state = next;
            saw_a.push(state.osc1_history);
            saw_b.push(state.osc2_history);
        }

        for n in 1_000..4_700 {
            assert!(
                (saw_a[n + 50] - saw_b[n]).abs() < 1e-2,
                "sample {n}: {} vs {}",
                saw_a[n + 50],
                saw_b[n]
            );
        }
    }

    #[test]
    fn test_half_width_pulse_is_symmetric() {
        let buffer = render_seconds(480.0, 0.5, 48_000.0, 1.0);
        let settled = &buffer[1_000..];

        // Half a period later the pulse is mirrored
        for n in 0..settled.len() - 50 {
            assert!((settled[n + 50] + settled[n]).abs() < 1e-2);
        }

        let positive = settled.iter().filter(|&&x| x > 0.0).count() as f32;
        let negative = settled.iter().filter(|&&x| x < 0.0).count() as f32;
        assert!((positive - negative).abs() / settled.len() as f32 <= 0.01);
    }

    #[test]
    fn test_zero_width_is_silent() {
        let buffer = render_seconds(440.0, 0.0, 48_000.0, 0.1);
        assert!(buffer.iter().all(|&x| x.abs() < 1e-6));
    }

    #[test]
    fn test_gain_scales_output() {
        let params = ParameterSnapshot {
            frequency: 440.0,
            ..ParameterSnapshot::default()
        };
        let mut unity = PulseOscillator::new();
        let mut doubled = PulseOscillator::new();
        let mut a = vec![0.0f32; 512];
        let mut b = vec![0.0f32; 512];
        unity.render(&mut a, &ParameterSnapshot { gain: 1.0, ..params }, 48_000.0);
        doubled.render(&mut b, &ParameterSnapshot { gain: 2.0, ..params }, 48_000.0);
        for (x, y) in a.iter().zip(&b) {
            assert!((2.0 * x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_reset_twice_equals_reset_once() {
        let mut osc = PulseOscillator::new();
        let mut buffer = vec![0.0f32; 256];
        osc.render(&mut buffer, &ParameterSnapshot::default(), 48_000.0);
        assert_ne!(osc.state(), PulseState::default());

        osc.reset();
        let once = (osc.state(), osc.coefficients(), osc.normalized_frequency());
        osc.reset();
        assert_eq!((osc.state(), osc.coefficients(), osc.normalized_frequency()), once);
        assert_eq!(osc.state(), PulseState::default());
    }

    #[test]
    fn test_degenerate_sample_rate_holds_still() {
        let mut osc = PulseOscillator::new();
        let mut buffer = vec![0.0f32; 64];
        osc.render(&mut buffer, &ParameterSnapshot::default(), 0.0);
        assert!(buffer.iter().all(|s| s.is_finite()));
        assert_eq!(osc.normalized_frequency(), 0.0);
    }

    #[test]
    fn test_frequency_above_nyquist_is_held_at_nyquist() {
        let mut osc = PulseOscillator::new();
        osc.set_frequency(20_000.0, 16_000.0);
        assert_eq!(osc.normalized_frequency(), 0.5);
        assert_eq!(osc.coefficients().scaling, 0.0);

        let buffer = render_seconds(20_000.0, 0.3, 16_000.0, 0.25);
        assert!(buffer.iter().all(|s| s.is_finite() && s.abs() <= 3.0));
    }
}
