//! Property-based tests for the synthesis primitives.
//!
//! Checks range, boundedness and stability invariants over randomized
//! frequencies, sample rates and control values using proptest.

use proptest::prelude::*;
use phasepluck::{
    dsp::{math, Excitation, KarplusString, Phasor, PulseOscillator},
    params::decay_to_feedback,
    ParamId, ParameterSnapshot, SharedParams,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any frequency below the sample rate the ramp stays in [0, 1).
    #[test]
    fn phasor_output_in_unit_range(
        sample_rate in 8_000.0f32..192_000.0f32,
        ratio in 0.0001f32..0.999f32,
        offset in 0.0f32..1.0f32,
    ) {
        let mut phasor = Phasor::new(sample_rate * ratio, sample_rate).with_offset(offset);
        for _ in 0..2_048 {
            let p = phasor.next_sample();
            prop_assert!((0.0..1.0).contains(&p), "phase {} (ratio {})", p, ratio);
        }
    }

    /// The ramp wraps once per round(sample_rate / hertz) samples, give or take one.
    #[test]
    fn phasor_period_matches_frequency(
        sample_rate in 22_050.0f32..96_000.0f32,
        hertz in 50.0f32..5_000.0f32,
    ) {
        let mut phasor = Phasor::new(hertz, sample_rate);
        let mut previous = phasor.next_sample();
        let mut wraps = Vec::new();
        for i in 1..8_192 {
            let p = phasor.next_sample();
            if p < previous {
                wraps.push(i);
            }
            previous = p;
        }

        let expected = (sample_rate / hertz).round() as i64;
        for pair in wraps.windows(2) {
            let period = (pair[1] - pair[0]) as i64;
            prop_assert!((period - expected).abs() <= 1, "period {} expected {}", period, expected);
        }
    }

    /// Across the audible range and any pulse width the oscillator stays
    /// finite and within its overshoot envelope.
    #[test]
    fn pulse_bounded(
        hertz in 20.0f32..20_000.0f32,
        pulse_width in 0.0f32..1.0f32,
        gain in 0.0f32..4.0f32,
    ) {
        let mut osc = PulseOscillator::new();
        let params = ParameterSnapshot { frequency: hertz, pulse_width, gain, ..ParameterSnapshot::default() };
        let mut buffer = vec![0.0f32; 4_096];
        osc.render(&mut buffer, &params, 48_000.0);

        for &s in &buffer {
            prop_assert!(s.is_finite(), "non-finite at {} Hz, width {}", hertz, pulse_width);
            prop_assert!(s.abs() <= 3.0 * gain + 1e-6, "{} at {} Hz, width {}", s, hertz, pulse_width);
        }
    }

    /// Scaling falls from 0.8125 at DC to 0 at Nyquist and never goes negative.
    #[test]
    fn pulse_scaling_in_range(w in 0.0f32..0.6f32) {
        let coeffs = phasepluck::dsp::pulse::PulseCoefficients::for_normalized(w);
        prop_assert!(coeffs.scaling >= 0.0);
        prop_assert!(coeffs.scaling <= 0.8125 + 1e-6);
    }

    /// A plucked string never gains energy, whatever the controls.
    #[test]
    fn string_bounded(
        hertz in 20.0f32..10_000.0f32,
        feedback in -1.0f32..2.0f32,
        filter_amount in 0.0f32..1.0f32,
        impulse in any::<bool>(),
        seed in any::<u32>(),
    ) {
        let mut string = KarplusString::with_seed(48_000.0, seed);
        string.set_frequency(hertz);
        string.set_feedback(feedback);
        string.set_damping(filter_amount);
        string.set_excitation(if impulse { Excitation::Impulse } else { Excitation::Noise });
        string.pluck();

        // Every sample read out is part of the line, so it is bounded by the
        // energy the pluck put in
        let start = string.energy();
        let limit = start.sqrt() * 1.000_1 + 1e-6;
        for _ in 0..8_192 {
            let s = string.next_sample();
            prop_assert!(s.is_finite());
            prop_assert!(s.abs() <= limit, "{} above {}", s, limit);
        }
        prop_assert!(string.energy() <= start * 1.000_1 + 1e-6);
    }

    /// Retuning while ringing keeps the line inside its preallocated bounds.
    #[test]
    fn string_retune_stays_in_bounds(
        frequencies in prop::collection::vec(-100.0f32..30_000.0f32, 1..16),
    ) {
        let mut string = KarplusString::new(44_100.0);
        string.pluck();
        for hertz in frequencies {
            string.set_frequency(hertz);
            prop_assert!(string.period() >= 2);
            prop_assert!(string.period() <= string.capacity());
            for _ in 0..64 {
                prop_assert!(string.next_sample().is_finite());
            }
        }
    }

    /// Stored values always land inside the declared range.
    #[test]
    fn shared_params_clamp(value in prop::num::f32::ANY, index in 0usize..5) {
        let id = ParamId::ALL[index];
        let spec = id.spec();
        let params = SharedParams::new();
        params.set(id, value);
        let stored = params.get(id);
        prop_assert!(stored >= spec.min && stored <= spec.max, "{:?} stored {}", id, stored);
    }

    /// Control travel round-trips through every curve.
    #[test]
    fn param_curves_round_trip(position in 0.001f32..1.0f32, index in 0usize..5) {
        let spec = ParamId::ALL[index].spec();
        let value = spec.denormalize(position);
        prop_assert!((spec.normalize(value) - position).abs() < 1e-3);
    }

    /// Decay always maps to a stable feedback coefficient.
    #[test]
    fn decay_maps_below_unity(decay in prop::num::f32::ANY) {
        let feedback = decay_to_feedback(decay);
        prop_assert!(feedback >= 0.95 - 1e-6 && feedback <= 0.999 + 1e-6, "{} -> {}", decay, feedback);
    }

    /// Wrapped values land in the target range.
    #[test]
    fn wrap_in_range(value in -1_000.0f32..1_000.0f32, low in -10.0f32..10.0f32, span in 0.1f32..10.0f32) {
        let wrapped = math::wrap(value, low, low + span);
        prop_assert!(wrapped >= low && wrapped < low + span, "{} -> {}", value, wrapped);
    }
}
