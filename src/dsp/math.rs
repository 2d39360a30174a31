//! Stateless numeric helpers shared by the oscillators and the parameter layer.

/*
Units and Conversions
=====================

Vocabulary
----------

  MIDI note   Integer-ish pitch index. 69 = A4 = 440 Hz, 60 = middle C.
              Every 12 notes doubles the frequency.

  dB          Logarithmic amplitude. 0 dB = 1.0 linear, -6 dB ≈ 0.5,
              -20 dB = 0.1, -60 dB = 0.001 (effectively silent).

  unit phase  Phase expressed in cycles instead of radians: 0.0 is the start
              of a cycle and 1.0 is the start of the next one. Every
              oscillator in this crate works in unit phase, so a sine is
              sin(2π·x) for x in [0, 1).


Polynomial Sine
---------------

`sin7` is a 7th-order polynomial fitted to sin(2π·x) over [0, 1). It costs
seven multiplies and seven adds (Horner form) and has no branches, which
matters when it runs twice per sample inside a feedback loop.

    x      sin7(x)     sin(2πx)
    0.00    0.000       0.000
    0.25    0.999       1.000
    0.50    0.000       0.000
    0.75   -0.999      -1.000

The worst-case error against the true sine is about 0.032. It is only valid
on [0, 1); feed it anything else and the polynomial runs off to infinity.

Which shaper the pulse oscillator uses is a build-time choice (`exact-sine`
feature). The two have audibly different harmonic content, so they are never
mixed within one build.
*/

/// Frequency of MIDI note 0 (C-1) in Hz.
const MIDI_NOTE_ZERO_HZ: f32 = 8.175_799;

/// Linearly map `value` from `[in_low, in_high]` onto `[out_low, out_high]`.
///
/// No clamping: values outside the input range extrapolate.
#[inline]
pub fn map_range(value: f32, in_low: f32, in_high: f32, out_low: f32, out_high: f32) -> f32 {
    out_low + (out_high - out_low) * ((value - in_low) / (in_high - in_low))
}

/// Linear interpolation between `a` (t = 0) and `b` (t = 1).
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

/// Convert a (possibly fractional) MIDI note number to Hz.
#[inline]
pub fn mtof(note: f32) -> f32 {
    MIDI_NOTE_ZERO_HZ * 2.0_f32.powf(note / 12.0)
}

/// Convert Hz to a fractional MIDI note number.
#[inline]
pub fn ftom(hz: f32) -> f32 {
    12.0 * (hz / MIDI_NOTE_ZERO_HZ).log2()
}

/// Decibels to linear amplitude.
#[inline]
pub fn db_to_amp(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Linear amplitude to decibels. Zero maps to negative infinity.
#[inline]
pub fn amp_to_db(amp: f32) -> f32 {
    20.0 * amp.log10()
}

/// Bipolar soft saturation onto (-1, 1).
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    2.0 / (1.0 + (-x).exp()) - 1.0
}

/// Wrap `value` into `[low, high)`, however many ranges away it is.
///
/// A degenerate range (`high <= low`) returns `low`.
#[inline]
pub fn wrap(value: f32, low: f32, high: f32) -> f32 {
    let range = high - low;
    if !(range > 0.0) {
        return low;
    }
    if value >= low && value < high {
        return value;
    }
    let wrapped = low + (value - low).rem_euclid(range);
    // rem_euclid can round up to exactly `range` for tiny negative inputs
    if wrapped >= high {
        low
    } else {
        wrapped
    }
}

/// 7th-order polynomial approximation of sin(2π·x), valid on [0, 1).
#[inline]
pub fn sin7(x: f32) -> f32 {
    x * (x
        * (x * (x * (x * (x * (66.572_38 * x - 233.003_32) + 275.754_5) - 106.877_93)
            + 0.156_842)
            - 9.858_993)
        + 7.256_532)
        - 8.881_784e-16
}

/// The sine shaper selected for this build: sin(2π·x) on [0, 1).
#[cfg(not(feature = "exact-sine"))]
#[inline]
pub fn sine01(x: f32) -> f32 {
    sin7(x)
}

/// The sine shaper selected for this build: sin(2π·x) on [0, 1).
#[cfg(feature = "exact-sine")]
#[inline]
pub fn sine01(x: f32) -> f32 {
    (x * std::f32::consts::TAU).sin()
}
